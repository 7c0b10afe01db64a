// Session loop tests - sentinel handling, retry ceiling and short-circuit.

mod common;

use common::{CountingTools, ScriptedProvider};
use research_indexer::application::agent::{Agent, AgentOptions, RetryPolicy};
use research_indexer::application::client::{ChatClient, ClientConfig};
use research_indexer::application::session::{GIVE_UP_MESSAGE, PROMPT, Session, SessionSummary};
use std::sync::Arc;

const FINAL: &str = r#"{"action":"final","response":"Transformers replaced recurrence."}"#;

async fn run_session(
    provider: &ScriptedProvider,
    tools: Arc<CountingTools>,
    input: &str,
) -> (SessionSummary, String) {
    let client = Arc::new(ChatClient::new(provider.clone(), ClientConfig::new("llama3")));
    let agent = Agent::new(client, tools).with_context("Purpose: research papers");
    let session = Session::new(&agent, AgentOptions::default(), RetryPolicy::default());

    let mut output = Vec::new();
    let summary = session
        .run(input.as_bytes(), &mut output)
        .await
        .expect("session runs");
    (summary, String::from_utf8(output).expect("utf8 output"))
}

#[tokio::test]
async fn quit_sentinel_first_makes_no_calls() {
    let provider = ScriptedProvider::new(vec![Ok(FINAL)]);
    let tools = Arc::new(CountingTools::default());

    let (summary, output) = run_session(&provider, tools.clone(), "q\nwhat is attention?\n").await;

    assert_eq!(summary, SessionSummary::default());
    assert_eq!(provider.calls(), 0);
    assert_eq!(tools.calls(), 0);
    assert_eq!(output, PROMPT);
}

#[tokio::test]
async fn sentinel_is_trimmed_and_blank_lines_skipped() {
    let provider = ScriptedProvider::new(vec![Ok(FINAL)]);
    let tools = Arc::new(CountingTools::default());

    let (summary, _) = run_session(&provider, tools, "\n   \n  q  \n").await;

    assert_eq!(summary.prompts, 0);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn always_failing_prompt_is_abandoned_after_three_attempts() {
    let provider = ScriptedProvider::new(vec![
        Err("connection refused"),
        Err("connection refused"),
        Err("connection refused"),
    ]);
    let tools = Arc::new(CountingTools::default());

    let (summary, output) = run_session(&provider, tools, "find papers\nq\n").await;

    assert_eq!(provider.calls(), 3);
    assert_eq!(
        summary,
        SessionSummary {
            prompts: 1,
            answered: 0,
            abandoned: 1,
        }
    );
    for attempt in 1..=3 {
        assert!(output.contains(&format!(
            "Error occurred, retry #{attempt}: The language model returned a response that could not be processed.\n"
        )));
    }
    assert!(!output.contains("retry #4"));
    assert!(!output.contains("connection refused"));
    assert!(output.contains(GIVE_UP_MESSAGE));
}

#[tokio::test]
async fn success_after_one_failure_short_circuits() {
    let provider = ScriptedProvider::new(vec![Err("model unavailable"), Ok(FINAL), Ok(FINAL)]);
    let tools = Arc::new(CountingTools::default());

    let (summary, output) = run_session(&provider, tools, "find papers\nq\n").await;

    assert_eq!(provider.calls(), 2);
    assert_eq!(summary.answered, 1);
    assert!(output.contains("Error occurred, retry #1: "));
    assert!(!output.contains("retry #2"));
    assert!(output.contains("Transformers replaced recurrence."));
    assert!(!output.contains(GIVE_UP_MESSAGE));
}

#[tokio::test]
async fn end_of_input_ends_the_session() {
    let provider = ScriptedProvider::new(vec![Ok(FINAL)]);
    let tools = Arc::new(CountingTools::default());

    let (summary, output) = run_session(&provider, tools, "one question").await;

    assert_eq!(summary.answered, 1);
    assert_eq!(output.matches(PROMPT).count(), 2);
}

#[tokio::test]
async fn tool_steps_are_listed_before_the_answer() {
    let provider = ScriptedProvider::new(vec![
        Ok(r#"{"action":"call_tool","tool":"search_research_tool","input":{"tags":"transformers"}}"#),
        Ok(FINAL),
    ]);
    let tools = Arc::new(CountingTools::default());

    let (_, output) = run_session(&provider, tools.clone(), "search transformers\nq\n").await;

    assert_eq!(tools.calls(), 1);
    let step = output.find("[tool] search_research_tool").expect("step listed");
    let answer = output.find("Transformers replaced recurrence.").expect("answer");
    assert!(step < answer);
}

#[tokio::test]
async fn unknown_tool_notice_names_the_tool() {
    let call = r#"{"action":"call_tool","tool":"translate"}"#;
    let provider = ScriptedProvider::new(vec![Ok(call), Ok(FINAL)]);
    let tools = Arc::new(CountingTools::default());

    let (summary, output) = run_session(&provider, tools, "translate this\nq\n").await;

    assert_eq!(summary.answered, 1);
    assert!(output.contains("Error occurred, retry #1: Tool \"translate\" is not available.\n"));
}
