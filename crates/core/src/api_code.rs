//! Backend result codes and their Vietnamese messages.
//!
//! Every backend envelope carries a `code` such as `auth-e-04`. The prefix
//! names the area, `s`/`e` marks success or error, and the number is the
//! case. Only codes with a user-facing message are listed here.

/// Returned by [`message`] for codes missing from the table.
pub const UNKNOWN_CODE: &str = "No code";

static CODES: &[(&str, &str)] = &[
    ("global-e-02", "Giá trị không hợp lệ"),
    // ─────────────────────────────────────────────────────────────────────
    // Auth
    // ─────────────────────────────────────────────────────────────────────
    ("auth-s-01", "Yêu cầu đăng ký của bạn đã thành công, hãy kiểm tra email"),
    ("auth-s-02", "Đăng ký thành công"),
    ("auth-s-03", "Đăng nhập thành công"),
    ("auth-s-08", "Yêu cầu thành công, hãy kiểm tra email của bạn 📧"),
    ("auth-s-09", "Lấy lại mật khẩu thành công, chào mừng bại trở lại 👋"),
    ("auth-e-01", "Email đã tồn tại"),
    ("auth-e-02", "Email chưa đăng ký"),
    ("auth-e-04", "Sai mật khẩu"),
    ("auth-e-05", "Mã code không tìm thấy"),
    ("auth-e-07", "Mật khẩu hiện tại không đúng"),
    // ─────────────────────────────────────────────────────────────────────
    // Address
    // ─────────────────────────────────────────────────────────────────────
    ("address-s-01", "Tạo địa chỉ mới thành công"),
    ("address-s-04", "Cập nhật địa chỉ thành công"),
    ("address-s-05", "Cập nhật địa chỉ mặc định thành công"),
    ("address-s-06", "Xóa địa chỉ thành công"),
    ("address-e-01", "Không tìm thấy địa chỉ"),
    ("address-e-02", "Không tìm thấy địa chỉ cần cập nhật"),
    ("address-e-03", "Không tìn thấy địa chỉ mặc định"),
    (
        "address-e-04",
        "Không thành công, bạn không phải là người tạo ra địa chỉ này",
    ),
];

/// Look up the message for `code`, if one is known.
#[must_use]
pub fn lookup(code: &str) -> Option<&'static str> {
    CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, message)| *message)
}

/// The message for `code`, or [`UNKNOWN_CODE`].
///
/// ```
/// use nongsan_core::api_code;
///
/// assert_eq!(api_code::message("auth-e-04"), "Sai mật khẩu");
/// assert_eq!(api_code::message("cart-e-99"), "No code");
/// ```
#[must_use]
pub fn message(code: &str) -> &'static str {
    lookup(code).unwrap_or_else(|| {
        tracing::debug!(code, "no message for api code");
        UNKNOWN_CODE
    })
}

/// Whether `code` reports success (`<area>-s-<n>`).
#[must_use]
pub fn is_success(code: &str) -> bool {
    code.split('-').nth(1) == Some("s")
}
