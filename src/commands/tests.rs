use super::*;
use crate::core::generation::{GenerationConfig, GenerationOverrides};
use crate::models::ModelRegistry;
use crate::utils::test_utils::ScriptedBackend;
use std::fs;
use tempfile::tempdir;

async fn ready_session() -> ChatSession {
    let registry = ModelRegistry::new(ScriptedBackend::new(), "cpu");
    let mut session = ChatSession::new(
        registry.get_handler("smolvlm2").unwrap(),
        GenerationConfig::default(),
    );
    session.load().await.unwrap();
    session
}

async fn session_with_turn() -> ChatSession {
    let mut session = ready_session().await;
    session
        .submit_turn(
            "what is <image:https://x.com/bee.jpg> this",
            &GenerationOverrides::default(),
        )
        .await
        .unwrap();
    session
}

#[tokio::test]
async fn quit_words_end_the_session() {
    let mut session = ready_session().await;
    for input in ["exit", "quit", "/exit", "/quit", "QUIT", "  /Exit  "] {
        assert_eq!(process_input(&mut session, input), CommandResult::Quit, "input={input}");
    }
}

#[tokio::test]
async fn plain_text_and_unknown_commands_are_messages() {
    let mut session = ready_session().await;
    for input in ["hello there", "/tmp/a.png describe", "/", "exit please"] {
        assert_eq!(
            process_input(&mut session, input),
            CommandResult::ProcessAsMessage(input.to_string()),
            "input={input}"
        );
    }
}

#[tokio::test]
async fn help_lists_every_command() {
    let mut session = ready_session().await;
    let CommandResult::Handled(help) = process_input(&mut session, "/help") else {
        panic!("expected help text");
    };
    for command in all_commands() {
        assert!(help.contains(command.usage), "missing {}", command.usage);
    }
    assert!(help.contains("<image:PATH_OR_URL>"));
    assert!(help.contains("--max-tokens"));
}

#[tokio::test]
async fn reset_command_clears_history() {
    let mut session = session_with_turn().await;
    assert_eq!(session.history().len(), 2);

    let result = process_input(&mut session, "/RESET");
    assert_eq!(
        result,
        CommandResult::Handled("Conversation cleared.".to_string())
    );
    assert!(session.history().is_empty());
    assert!(session.is_ready());
}

#[tokio::test]
async fn history_command_shows_recent_messages() {
    let mut session = session_with_turn().await;
    let CommandResult::Handled(text) = process_input(&mut session, "/history") else {
        panic!("expected history text");
    };
    assert!(text.starts_with("1 turn(s), 2 message(s) with smolvlm2"), "{text}");
    assert!(text.contains("You: what is <image:https://x.com/bee.jpg> this"));
    assert!(text.ends_with("\nok"));
}

#[tokio::test]
async fn dump_writes_transcript() {
    let session = session_with_turn().await;
    let dir = tempdir().unwrap();
    let path = dir.path().join("chat.txt");

    dump_conversation(&session, &path).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(
        contents,
        "You: what is <image:https://x.com/bee.jpg> this\n\nok\n\n"
    );
}

#[tokio::test]
async fn dump_refuses_to_overwrite() {
    let mut session = session_with_turn().await;
    let dir = tempdir().unwrap();
    let path = dir.path().join("chat.txt");
    fs::write(&path, "keep me").unwrap();

    let input = format!("/dump {}", path.display());
    let CommandResult::Handled(message) = process_input(&mut session, &input) else {
        panic!("expected dump result");
    };
    assert!(message.starts_with("Dump error: File"), "{message}");
    assert!(message.contains("already exists"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
}

#[tokio::test]
async fn dump_of_empty_history_fails() {
    let session = ready_session().await;
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.txt");

    let err = dump_conversation(&session, &path).unwrap_err();
    assert!(err.to_string().contains("history is empty"));
    assert!(!path.exists());
}

#[tokio::test]
async fn dump_rejects_extra_arguments() {
    let mut session = session_with_turn().await;
    assert_eq!(
        process_input(&mut session, "/dump a.txt b.txt"),
        CommandResult::Handled("Usage: /dump [filename]".to_string())
    );
}

#[test]
fn default_dump_filename_is_dated() {
    let name = default_dump_filename();
    assert!(name.starts_with("qllama-log-"));
    assert!(name.ends_with(".txt"));
    let date = &name["qllama-log-".len()..name.len() - ".txt".len()];
    assert!(chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok(), "{date}");
}
