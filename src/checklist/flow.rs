//! The transition function that drives the checklist conversation.
//!
//! [`apply`] is pure over the session: it takes the current session, one
//! inbound event, and the checklist configuration, mutates the session, and
//! returns the outbound prompts. No transport or network dependency, so the
//! whole conversation can be tested as plain function calls.

use crate::checklist::session::Session;
use crate::checklist::state::FlowState;
use crate::config::ChecklistConfig;

/// Reply-keyboard option marking the current entry as fine.
pub const ALL_CLEAR: &str = "All clear";
/// Reply-keyboard option opening a comment on the current entry.
pub const LEAVE_COMMENT: &str = "Leave a comment";
/// Reply-keyboard option declining the photo upload.
pub const SKIP_OPTION: &str = "/skip";

/// One inbound event, already decoded by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `/start` — force-resets the session from any state.
    Start,
    /// `/skip` — declines the photo upload for the current entry.
    Skip,
    /// A free-text reply.
    Text(String),
    /// A photo already resolved to a durable URL.
    Photo(String),
}

/// An outbound prompt for the transport to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Plain text message.
    Text(String),
    /// Text with a reply keyboard of short option labels.
    Choices { text: String, options: Vec<String> },
}

/// Result of applying one event to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Prompts to send, in order.
    pub replies: Vec<Outbound>,
    /// Set when the pass just finished and the report pipeline should run.
    pub completed: bool,
}

impl Step {
    fn ignore() -> Self {
        Self {
            replies: Vec::new(),
            completed: false,
        }
    }

    fn reply(replies: Vec<Outbound>) -> Self {
        Self {
            replies,
            completed: false,
        }
    }

    fn finished(replies: Vec<Outbound>) -> Self {
        Self {
            replies,
            completed: true,
        }
    }
}

/// The prompts that open a fresh pass: greeting plus the location keyboard.
pub fn start_prompts(config: &ChecklistConfig) -> Vec<Outbound> {
    vec![
        Outbound::Text("Let's start the checklist. Please select a location:".to_string()),
        Outbound::Choices {
            text: "Choose a location:".to_string(),
            options: config.location_labels(),
        },
    ]
}

/// Apply one event to the session and compute the outbound prompts.
///
/// Events that don't fit the current state are ignored: no state change, no
/// reply. The free-text location reply is accepted verbatim, without checking
/// it against the rendered options.
pub fn apply(session: &mut Session, event: Event, config: &ChecklistConfig) -> Step {
    if event == Event::Start {
        session.reset();
        return Step::reply(start_prompts(config));
    }

    match session.state {
        FlowState::AwaitingLocation => on_location(session, event),
        FlowState::AwaitingClearance => on_clearance(session, event),
        FlowState::AwaitingComment => on_comment(session, event),
        FlowState::AwaitingPhoto => on_photo(session, event),
        FlowState::Completed => Step::ignore(),
    }
}

fn on_location(session: &mut Session, event: Event) -> Step {
    let Event::Text(location) = event else {
        return Step::ignore();
    };
    if session.transition_to(FlowState::AwaitingClearance).is_err() {
        return Step::ignore();
    }
    session.begin_pass(location.clone());
    Step::reply(vec![
        Outbound::Text(format!("You have selected: {location}")),
        Outbound::Text("Starting the checklist process. Please answer each entry.".to_string()),
        clearance_prompt(1),
    ])
}

fn on_clearance(session: &mut Session, event: Event) -> Step {
    let Some(entry) = session.current_entry() else {
        return Step::ignore();
    };
    // Only the two offered option texts match; anything else is ignored.
    match event {
        Event::Text(text) if text == ALL_CLEAR => advance(session),
        Event::Text(text) if text == LEAVE_COMMENT => {
            if session.transition_to(FlowState::AwaitingComment).is_err() {
                return Step::ignore();
            }
            Step::reply(vec![Outbound::Text(format!(
                "Please provide a comment for entry {entry}:"
            ))])
        }
        _ => Step::ignore(),
    }
}

fn on_comment(session: &mut Session, event: Event) -> Step {
    let Some(entry) = session.current_entry() else {
        return Step::ignore();
    };
    let Event::Text(comment) = event else {
        return Step::ignore();
    };
    if session.record_comment(entry, comment).is_err() {
        return Step::ignore();
    }
    if session.transition_to(FlowState::AwaitingPhoto).is_err() {
        return Step::ignore();
    }
    Step::reply(vec![Outbound::Choices {
        text: format!(
            "Please upload a photo related to your comment for entry {entry}, \
             or skip to continue without one."
        ),
        options: vec![SKIP_OPTION.to_string()],
    }])
}

fn on_photo(session: &mut Session, event: Event) -> Step {
    let Some(entry) = session.current_entry() else {
        return Step::ignore();
    };
    match event {
        Event::Skip => advance(session),
        Event::Photo(url) => {
            if session.record_photo(entry, url).is_err() {
                return Step::ignore();
            }
            advance(session)
        }
        _ => Step::ignore(),
    }
}

/// Move to the next entry, or complete the pass after the last one.
fn advance(session: &mut Session) -> Step {
    let Some(entry) = session.current_entry() else {
        return Step::ignore();
    };
    if entry < session.entries() {
        if session.transition_to(FlowState::AwaitingClearance).is_err() {
            return Step::ignore();
        }
        match session.advance_entry() {
            Ok(next) => Step::reply(vec![clearance_prompt(next)]),
            Err(_) => Step::ignore(),
        }
    } else {
        if session.transition_to(FlowState::Completed).is_err() {
            return Step::ignore();
        }
        Step::finished(vec![Outbound::Text(
            "Checklist complete. Analyzing the report, please wait...".to_string(),
        )])
    }
}

fn clearance_prompt(entry: usize) -> Outbound {
    Outbound::Choices {
        text: format!("Checklist entry {entry}: Is everything clear?"),
        options: vec![ALL_CLEAR.to_string(), LEAVE_COMMENT.to_string()],
    }
}
