use super::*;

fn built_headers(stage: &dyn RequestStage) -> reqwest::header::HeaderMap {
    let builder = reqwest::Client::new().get("http://127.0.0.1:9/probe");
    stage.apply(builder).build().unwrap().headers().clone()
}

#[test]
fn parse_splits_name_and_value() {
    let stage = HeaderStage::parse("X-Console-Client: cli").unwrap();
    assert_eq!(stage.header_name().as_str(), "x-console-client");
    let headers = built_headers(&stage);
    assert_eq!(headers.get("x-console-client").unwrap(), "cli");
}

#[test]
fn parse_value_may_contain_colons() {
    let stage = HeaderStage::parse("x-trace: a:b:c").unwrap();
    let headers = built_headers(&stage);
    assert_eq!(headers.get("x-trace").unwrap(), "a:b:c");
}

#[test]
fn parse_requires_separator() {
    assert!(matches!(HeaderStage::parse("no-separator"), Err(HeaderStageError::Format(_))));
}

#[test]
fn parse_rejects_bad_name() {
    assert!(matches!(HeaderStage::parse("bad name: x"), Err(HeaderStageError::Name(_))));
}

#[test]
fn header_stage_name_is_stable() {
    let stage = HeaderStage::parse("x-a: 1").unwrap();
    assert_eq!(stage.name(), "header");
}
