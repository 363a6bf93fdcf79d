//! Tests for account field validation.

use super::*;
use rstest::rstest;

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

fn member(full_name: Option<&str>, admin_level: i16) -> User {
    User {
        id: UserId::new(VALID_ID).expect("valid id"),
        email: EmailAddress::new("ada@example.com").expect("valid email"),
        username: Username::new("ada").expect("valid username"),
        full_name: full_name.map(str::to_owned),
        admin_level,
    }
}

#[rstest]
fn user_id_parses_uuid() {
    let id = UserId::new(VALID_ID).expect("valid id");
    assert_eq!(id.to_string(), VALID_ID);
}

#[rstest]
#[case("not-a-uuid")]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
#[case("")]
fn user_id_rejects_bad_input(#[case] raw: &str) {
    assert_eq!(UserId::new(raw), Err(UserValidationError::InvalidId));
}

#[rstest]
fn email_is_trimmed_and_lowercased() {
    let email = EmailAddress::new("  Ada@Example.COM ").expect("valid email");
    assert_eq!(email.as_ref(), "ada@example.com");
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("ada", UserValidationError::InvalidEmail)]
#[case("ada@example", UserValidationError::InvalidEmail)]
#[case("a da@example.com", UserValidationError::InvalidEmail)]
fn email_rejects_malformed_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(EmailAddress::new(raw), Err(expected));
}

#[rstest]
#[case("ada")]
#[case("ada.lovelace-1815_x")]
fn username_accepts_allowed_characters(#[case] raw: &str) {
    assert!(Username::new(raw).is_ok());
}

#[rstest]
#[case("ab")]
#[case("abcdefghijklmnopqrstuvwxyz0123456")]
fn username_rejects_bad_length(#[case] raw: &str) {
    assert!(matches!(
        Username::new(raw),
        Err(UserValidationError::UsernameLength { .. })
    ));
}

#[rstest]
fn username_rejects_spaces() {
    assert_eq!(
        Username::new("ada lovelace"),
        Err(UserValidationError::UsernameInvalidCharacters)
    );
}

#[rstest]
#[case(0, false)]
#[case(1, true)]
#[case(3, true)]
fn admin_level_controls_admin_access(#[case] level: i16, #[case] expected: bool) {
    assert_eq!(member(None, level).is_admin(), expected);
}

#[rstest]
#[case(Some("Ada Lovelace"), "Ada Lovelace")]
#[case(Some("  "), "ada")]
#[case(None, "ada")]
fn greeting_prefers_full_name(#[case] full_name: Option<&str>, #[case] expected: &str) {
    assert_eq!(member(full_name, 0).greeting_name(), expected);
}

#[rstest]
fn new_user_drops_blank_full_name() {
    let new_user = NewUser::try_new("ada@example.com", " ada ", Some("   ")).expect("valid");
    assert_eq!(new_user.username.as_ref(), "ada");
    assert!(new_user.full_name.is_none());
}

#[rstest]
fn new_user_rejects_long_full_name() {
    let long = "x".repeat(FULL_NAME_MAX + 1);
    assert_eq!(
        NewUser::try_new("ada@example.com", "ada", Some(&long)),
        Err(UserValidationError::FullNameTooLong { max: FULL_NAME_MAX })
    );
}

#[rstest]
fn user_serialises_camel_case() {
    let value = serde_json::to_value(member(Some("Ada"), 1)).expect("serialise");
    assert_eq!(value["fullName"], "Ada");
    assert_eq!(value["adminLevel"], 1);
    assert_eq!(value["id"], VALID_ID);
}
