//! Server version command.

use std::io::Write;

use super::{ActionResult, Metadata, Session};

/// `version`: print the server version.
pub fn run(session: &mut Session, _args: &[String]) -> ActionResult {
    let version = session.client().version().get()?.version;
    writeln!(session.out, "Ollama Server Version: {}", version)?;
    Ok(Some(Metadata::from([("version".to_string(), version)])))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    use super::*;
    use crate::commands::testing;

    #[test]
    fn test_version_is_printed_and_returned() {
        let (runtime, server) = testing::mock_server();
        testing::mount(
            &runtime,
            &server,
            Mock::given(method("GET"))
                .and(path("/api/version"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "0.6.2"}))),
        );

        let (mut session, out, _) = testing::session(&server.uri());
        let metadata = run(&mut session, &[]).unwrap().unwrap();
        assert_eq!(metadata["version"], "0.6.2");
        assert_eq!(out.contents(), "Ollama Server Version: 0.6.2\n");
    }

    #[test]
    fn test_unreachable_server_is_an_error() {
        let (mut session, out, _) = testing::session("http://127.0.0.1:9");
        assert!(run(&mut session, &[]).is_err());
        assert!(out.contents().is_empty());
    }
}
