//! Chat command: send one message and stream the reply.

use std::io::Write;

use console::Style;

use super::stream::print_stream;
use super::{ActionResult, Session, require_args, rule};

const USAGE: &str = "chat <model> <role> <prompt>";

/// `chat <model> <role> <prompt...>`
///
/// Each call is a fresh single-message exchange; no continuation token is
/// sent or kept.
pub fn run(session: &mut Session, args: &[String]) -> ActionResult {
    require_args(args, 3, USAGE)?;
    let (model, role) = (&args[0], &args[1]);
    let prompt = args[2..].join(" ");

    writeln!(session.out, "{}", rule())?;
    writeln!(session.out, "Sending a chat message")?;
    tracing::debug!(%model, %role, "Chat request");

    let stream = session.client().chat().stream_message(model, role, prompt)?;
    let verbosity = session.verbosity();
    let summary = print_stream(stream, &mut session.out, &Style::new(), verbosity)?;
    tracing::debug!(fragments = summary.fragments, completed = summary.completed, "Chat finished");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, ResponseTemplate};

    use super::*;
    use crate::commands::testing::{self, args};

    #[test]
    fn test_chat_requires_three_arguments() {
        let (mut session, out, _) = testing::session("http://127.0.0.1:9");
        let err = run(&mut session, &args(&["llama3.2", "user"])).unwrap_err();
        assert!(err.to_string().contains("Usage: chat <model> <role> <prompt>"));
        assert!(out.contents().is_empty());
    }

    #[test]
    fn test_chat_joins_prompt_and_streams_reply() {
        let (runtime, server) = testing::mock_server();
        let body = concat!(
            "{\"message\":{\"role\":\"assistant\",\"content\":\"Hi\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\" there\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n",
        );
        testing::mount(
            &runtime,
            &server,
            Mock::given(method("POST"))
                .and(path("/api/chat"))
                .and(body_json(json!({
                    "model": "llama3.2",
                    "messages": [{"role": "user", "content": "say hi please"}]
                })))
                .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson")),
        );

        let (mut session, out, _) = testing::session(&server.uri());
        let metadata = run(&mut session, &args(&["llama3.2", "user", "say", "hi", "please"])).unwrap();

        assert!(metadata.is_none());
        let printed = out.contents();
        assert!(printed.contains("Sending a chat message"));
        assert!(printed.contains("Hi there\n"));
    }
}
