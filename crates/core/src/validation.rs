//! Form validation for login, registration and market prices.
//!
//! Messages are shown to end users verbatim, so they are Vietnamese. Each
//! validator stops at the first failing rule.

use chrono::NaiveDate;

use crate::dto::{LoginRequest, MarketPriceCreationRequest, RegisterRequest};
use crate::types::{Email, ProductId, Role, Vnd};

/// Minimum password length accepted by login and registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// A form field that failed validation.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Email là bắt buộc")]
    EmailRequired,
    #[error("Email chưa đúng")]
    EmailInvalid,
    #[error("Mật khẩu là bắt buộc")]
    PasswordRequired,
    #[error("Mật khẩu phải có ít nhất 8 ký tự")]
    PasswordTooShort,
    #[error("Xác nhận mật khẩu là bắt buộc")]
    ConfirmPasswordRequired,
    #[error("Xác nhận mật khẩu phải trùng với mật khẩu")]
    ConfirmPasswordMismatch,
    #[error("Sản phẩm không được để trống")]
    ProductRequired,
    #[error("Giá không được để trống")]
    PriceRequired,
    #[error("Giá phải là số nguyên dương")]
    PriceNotInteger,
    #[error("Vùng miền không được để trống")]
    RegionRequired,
    #[error("Ngày ghi nhận không hợp lệ")]
    DateInvalid,
}

impl ValidationError {
    /// The form field the error belongs to.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::EmailRequired | Self::EmailInvalid => "email",
            Self::PasswordRequired | Self::PasswordTooShort => "password",
            Self::ConfirmPasswordRequired | Self::ConfirmPasswordMismatch => "confirmPassword",
            Self::ProductRequired => "productId",
            Self::PriceRequired | Self::PriceNotInteger => "price",
            Self::RegionRequired => "region",
            Self::DateInvalid => "dateRecorded",
        }
    }
}

fn check_email(email: &str) -> Result<String, ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    Email::parse(email)
        .map(Email::into_inner)
        .map_err(|_| ValidationError::EmailInvalid)
}

fn check_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Validate the login form and build the request.
///
/// # Errors
///
/// Returns the first failing rule: email required/valid, then password
/// required and at least [`MIN_PASSWORD_LEN`] characters.
pub fn login(email: &str, password: &str, role: Role) -> Result<LoginRequest, ValidationError> {
    let email = check_email(email)?;
    check_password(password)?;
    Ok(LoginRequest {
        email,
        password: password.to_string(),
        role,
    })
}

/// Validate the registration form and build the request.
///
/// # Errors
///
/// Same rules as [`login`], plus a non-empty `confirm_password` equal to
/// `password`.
pub fn register(
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<RegisterRequest, ValidationError> {
    let email = check_email(email)?;
    check_password(password)?;
    if confirm_password.is_empty() {
        return Err(ValidationError::ConfirmPasswordRequired);
    }
    if confirm_password != password {
        return Err(ValidationError::ConfirmPasswordMismatch);
    }
    Ok(RegisterRequest {
        email,
        password: password.to_string(),
    })
}

/// Raw market price form input, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketPriceForm {
    pub product_id: String,
    pub price: String,
    pub region: String,
    /// `YYYY-MM-DD`.
    pub date_recorded: String,
}

impl MarketPriceForm {
    /// Validate and convert into a creation request.
    ///
    /// # Errors
    ///
    /// Returns the first failing field in form order.
    pub fn validate(&self) -> Result<MarketPriceCreationRequest, ValidationError> {
        if self.product_id.is_empty() {
            return Err(ValidationError::ProductRequired);
        }
        if self.price.is_empty() {
            return Err(ValidationError::PriceRequired);
        }
        if !self.price.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::PriceNotInteger);
        }
        let price = self
            .price
            .parse::<i64>()
            .map_err(|_| ValidationError::PriceNotInteger)?;
        if self.region.is_empty() {
            return Err(ValidationError::RegionRequired);
        }
        let date_recorded = NaiveDate::parse_from_str(self.date_recorded.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::DateInvalid)?;

        Ok(MarketPriceCreationRequest {
            price: Vnd::new(price),
            date_recorded,
            region: self.region.clone(),
            product_id: ProductId::new(self.product_id.clone()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_rules_in_order() {
        assert_eq!(
            login("", "", Role::Consumer).unwrap_err(),
            ValidationError::EmailRequired
        );
        assert_eq!(
            login("not-an-email", "", Role::Consumer).unwrap_err(),
            ValidationError::EmailInvalid
        );
        assert_eq!(
            login("a@b.vn", "", Role::Consumer).unwrap_err(),
            ValidationError::PasswordRequired
        );
        let err = login("a@b.vn", "1234567", Role::Consumer).unwrap_err();
        assert_eq!(err.to_string(), "Mật khẩu phải có ít nhất 8 ký tự");
        assert_eq!(err.field(), "password");

        let request = login(" a@b.vn ", "12345678", Role::Admin).unwrap();
        assert_eq!(request.email, "a@b.vn");
        assert_eq!(request.role, Role::Admin);
    }

    #[test]
    fn test_register_confirm_password() {
        assert_eq!(
            register("a@b.vn", "matkhau123", "").unwrap_err(),
            ValidationError::ConfirmPasswordRequired
        );
        assert_eq!(
            register("a@b.vn", "matkhau123", "matkhau124")
                .unwrap_err()
                .to_string(),
            "Xác nhận mật khẩu phải trùng với mật khẩu"
        );
        assert!(register("a@b.vn", "matkhau123", "matkhau123").is_ok());
    }

    #[test]
    fn test_market_price_form() {
        let mut form = MarketPriceForm {
            product_id: "p1".into(),
            price: "25000".into(),
            region: "Miền Bắc".into(),
            date_recorded: "2024-06-30".into(),
        };
        let request = form.validate().unwrap();
        assert_eq!(request.price, Vnd::new(25_000));
        assert_eq!(request.product_id.as_str(), "p1");

        form.price = "-5".into();
        assert_eq!(form.validate().unwrap_err(), ValidationError::PriceNotInteger);

        form.price = "5".into();
        form.date_recorded = "hôm qua".into();
        assert_eq!(form.validate().unwrap_err(), ValidationError::DateInvalid);

        form.product_id.clear();
        assert_eq!(form.validate().unwrap_err().to_string(), "Sản phẩm không được để trống");
    }
}
