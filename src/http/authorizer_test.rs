use super::*;
use crate::session::Session;

fn handle_with_token(token: Option<&str>) -> SessionHandle {
    SessionHandle::new(Session {
        is_logged_in: token.is_some(),
        token: token.map(str::to_owned),
        auth_checked: true,
        ..Session::default()
    })
}

fn authorization_of(stage: &BearerAuthorizer) -> Option<String> {
    let builder = reqwest::Client::new().get("http://127.0.0.1:9/admin/me");
    let request = stage.apply(builder).build().unwrap();
    request
        .headers()
        .get(AUTHORIZATION)
        .map(|v| v.to_str().unwrap().to_owned())
}

#[test]
fn adds_bearer_header_when_token_present() {
    let stage = BearerAuthorizer::new(handle_with_token(Some("abc123")));
    assert_eq!(authorization_of(&stage).as_deref(), Some("Bearer abc123"));
}

#[test]
fn passes_request_through_without_token() {
    let stage = BearerAuthorizer::new(handle_with_token(None));
    assert_eq!(authorization_of(&stage), None);
}

#[test]
fn empty_token_adds_no_header() {
    let stage = BearerAuthorizer::new(handle_with_token(Some("")));
    assert_eq!(authorization_of(&stage), None);
}

#[test]
fn token_with_control_chars_degrades_to_no_header() {
    let stage = BearerAuthorizer::new(handle_with_token(Some("bad\ntoken")));
    assert_eq!(authorization_of(&stage), None);
}

#[test]
fn reads_token_at_send_time() {
    let handle = handle_with_token(None);
    let stage = BearerAuthorizer::new(handle.clone());
    assert_eq!(authorization_of(&stage), None);

    handle.update(|s| s.token = Some("late".into()));
    assert_eq!(authorization_of(&stage).as_deref(), Some("Bearer late"));

    handle.update(|s| s.token = None);
    assert_eq!(authorization_of(&stage), None);
}

#[test]
fn header_value_is_marked_sensitive() {
    let stage = BearerAuthorizer::new(handle_with_token(Some("abc")));
    assert!(stage.header_value().unwrap().is_sensitive());
}

#[test]
fn poisoned_session_lock_degrades_to_no_header() {
    let handle = handle_with_token(Some("abc"));
    let poisoner = handle.clone();
    let _ = std::thread::spawn(move || {
        poisoner.update(|_| panic!("poison the session lock"));
    })
    .join();

    let stage = BearerAuthorizer::new(handle);
    assert_eq!(authorization_of(&stage), None);
}
