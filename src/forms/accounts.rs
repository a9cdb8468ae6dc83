use jiff::civil::Date;

use super::{FieldErrors, FieldSpec, FormData, FormSpec, Validator, Widget};

pub const MIN_PASSWORD_LEN: usize = 8;

pub static LOGIN_FORM: FormSpec = FormSpec {
    fields: &[
        FieldSpec::new("username", "Username", &[Validator::MaxLength(150)]),
        FieldSpec::new("password", "Password", &[]).widget(Widget::Password),
    ],
};

pub static REGISTER_FORM: FormSpec = FormSpec {
    fields: &[
        FieldSpec::new("username", "Username", &[Validator::MaxLength(150)]),
        FieldSpec::new("password", "Password", &[Validator::MaxLength(128)])
            .widget(Widget::Password),
        FieldSpec::new("password_confirm", "Password confirmation", &[])
            .widget(Widget::Password),
    ],
};

#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn parse_login(data: &FormData, today: Date) -> Result<Self, FieldErrors> {
        let cleaned = LOGIN_FORM.clean(data, "", today)?;
        Ok(Self {
            username: cleaned.text("username").unwrap_or_default(),
            password: cleaned.text("password").unwrap_or_default(),
        })
    }

    pub fn parse_registration(data: &FormData, today: Date) -> Result<Self, FieldErrors> {
        let cleaned = REGISTER_FORM.clean(data, "", today)?;
        let username = cleaned.text("username").unwrap_or_default();
        let password = cleaned.text("password").unwrap_or_default();

        let mut errors = FieldErrors::new();
        if username.chars().any(char::is_whitespace) {
            errors.add("username", "Usernames may not contain spaces.");
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password",
                format!("This password is too short. It must contain at least {MIN_PASSWORD_LEN} characters."),
            );
        }
        if cleaned.text("password_confirm").as_deref() != Some(password.as_str()) {
            errors.add("password_confirm", "The two password fields didn't match.");
        }
        errors.into_result(Self { username, password })
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn registration_checks_password() {
        let data = FormData::new()
            .with("username", "reader")
            .with("password", "short")
            .with("password_confirm", "shorter");
        let errors = Credentials::parse_registration(&data, date(2024, 1, 1)).expect_err("invalid");
        assert_eq!(errors.field("password").len(), 1);
        assert_eq!(errors.field("password_confirm").len(), 1);
        assert!(errors.field("username").is_empty());
    }

    #[test]
    fn registration_accepts_matching_passwords() {
        let data = FormData::new()
            .with("username", "reader")
            .with("password", "correct horse")
            .with("password_confirm", "correct horse");
        let creds = Credentials::parse_registration(&data, date(2024, 1, 1)).expect("valid");
        assert_eq!(creds.username, "reader");
    }
}
