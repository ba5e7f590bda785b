use rand::thread_rng;

use crate::error::StoreError;
use crate::store::{PublicImageUrls, Question};

pub mod grader;
pub mod layout;
pub mod messages;
pub mod picker;

pub use messages::{ClientToServerMessage, ServerToClientMessage};

use grader::{Verdict, grade};
use layout::{classify, is_image_ref};
use messages::{OptionView, QuestionView, SessionSnapshot};
use picker::draw_question_index;

const OPTION_NUMBERS: [&str; 5] = ["1", "2", "3", "4", "5"];

/// The session's lifecycle. Exactly one of these holds at any time; a grading
/// verdict exists only while a question is in the graded state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    Loading,
    /// Terminal: zero usable rows, or the load failed.
    Empty,
    AwaitingAnswer,
    Graded(Verdict),
}

/// One user's quiz session, owned by a single connection task for its whole
/// lifetime. All transitions run on discrete, non-overlapping events.
#[derive(Debug)]
pub struct QuizSession {
    phase: SessionPhase,
    questions: Vec<Question>,
    /// Indices into `questions` not yet shown in the current cycle.
    available_pool: Vec<usize>,
    current_index: Option<usize>,
    selected_option: Option<String>,
    image_ready: bool,
    image_urls: PublicImageUrls,
}

impl QuizSession {
    pub fn new(image_urls: PublicImageUrls) -> Self {
        Self {
            phase: SessionPhase::Loading,
            questions: Vec::new(),
            available_pool: Vec::new(),
            current_index: None,
            selected_option: None,
            image_ready: false,
            image_urls,
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Seeds the session with the load outcome, exactly once. A failed load
    /// is logged and collapses to the same terminal state as an empty bank.
    pub fn questions_loaded(&mut self, result: Result<Vec<Question>, StoreError>) {
        if self.phase != SessionPhase::Loading {
            tracing::warn!(phase = ?self.phase, "Ignoring duplicate question load");
            return;
        }

        let questions = match result {
            Ok(questions) => questions,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load questions");
                self.phase = SessionPhase::Empty;
                return;
            }
        };

        if questions.is_empty() {
            tracing::info!("Question bank is empty");
            self.phase = SessionPhase::Empty;
            return;
        }

        self.available_pool = (0..questions.len()).collect();
        self.questions = questions;
        self.advance_to_next_question();
    }

    /// Applies one client event. Returns whether the session state changed
    /// (and a fresh snapshot should be pushed).
    pub fn handle_event(&mut self, message: ClientToServerMessage) -> bool {
        match message {
            ClientToServerMessage::SelectOption { option } => self.select_option(option),
            ClientToServerMessage::SubmitAnswer => self.submit(),
            ClientToServerMessage::NextQuestion => self.next_question(),
            ClientToServerMessage::ImageLoaded => self.image_loaded(),
        }
    }

    fn select_option(&mut self, option: String) -> bool {
        if self.phase != SessionPhase::AwaitingAnswer {
            tracing::trace!(phase = ?self.phase, "Ignoring selection outside AwaitingAnswer");
            return false;
        }
        if !OPTION_NUMBERS.contains(&option.as_str()) {
            tracing::warn!(option = %option, "Ignoring selection of unknown option");
            return false;
        }

        self.selected_option = Some(option);
        true
    }

    fn image_loaded(&mut self) -> bool {
        if self.phase != SessionPhase::AwaitingAnswer || self.image_ready {
            return false;
        }
        self.image_ready = true;
        true
    }

    fn submit(&mut self) -> bool {
        if self.phase != SessionPhase::AwaitingAnswer {
            tracing::trace!(phase = ?self.phase, "Ignoring submission outside AwaitingAnswer");
            return false;
        }
        // Submission is gated on a selection and on the question image having
        // finished loading; anything premature is dropped at this boundary.
        if !self.image_ready {
            tracing::trace!("Ignoring submission before image is ready");
            return false;
        }
        let Some(selected) = self.selected_option.as_deref() else {
            tracing::trace!("Ignoring submission without a selection");
            return false;
        };
        let Some(question) = self.current_question() else {
            tracing::error!("AwaitingAnswer with no current question");
            return false;
        };

        let verdict = grade(question, selected);
        tracing::debug!(
            question.round = %question.round,
            question.number = question.number,
            selected = %selected,
            verdict.is_correct = verdict.is_correct,
            "Graded submission"
        );
        self.phase = SessionPhase::Graded(verdict);
        true
    }

    fn next_question(&mut self) -> bool {
        if !matches!(self.phase, SessionPhase::Graded(_)) {
            tracing::trace!(phase = ?self.phase, "Ignoring advance outside Graded");
            return false;
        }
        self.advance_to_next_question();
        true
    }

    fn advance_to_next_question(&mut self) {
        self.selected_option = None;
        self.image_ready = false;

        let index =
            draw_question_index(&mut self.available_pool, self.questions.len(), &mut thread_rng());
        self.current_index = Some(index);
        self.phase = SessionPhase::AwaitingAnswer;

        tracing::debug!(
            question.index = index,
            pool.remaining = self.available_pool.len(),
            "Advanced to next question"
        );
    }

    fn current_question(&self) -> Option<&Question> {
        self.current_index.and_then(|i| self.questions.get(i))
    }

    /// Assembles the full view of the session for the rendering layer.
    pub fn snapshot(&self) -> SessionSnapshot {
        match &self.phase {
            SessionPhase::Loading => SessionSnapshot::Loading,
            SessionPhase::Empty => SessionSnapshot::Empty,
            SessionPhase::AwaitingAnswer | SessionPhase::Graded(_) => {
                let Some(question) = self.current_question() else {
                    tracing::error!("Active phase with no current question");
                    return SessionSnapshot::Empty;
                };

                let options = OPTION_NUMBERS
                    .iter()
                    .zip(question.options.iter())
                    .map(|(number, value)| {
                        let is_image = is_image_ref(value);
                        OptionView {
                            number: (*number).to_string(),
                            is_image,
                            text: (!is_image).then(|| value.clone()),
                            image_url: self.image_urls.resolve(&question.round, value),
                        }
                    })
                    .collect();

                let verdict = match &self.phase {
                    SessionPhase::Graded(verdict) => Some(verdict.clone()),
                    _ => None,
                };

                SessionSnapshot::Question(QuestionView {
                    round: question.round.clone(),
                    number: question.number,
                    image_url: self
                        .image_urls
                        .question_image(&question.round, question.number),
                    layout: classify(&question.options),
                    options,
                    image_ready: self.image_ready,
                    selected_option: self.selected_option.clone(),
                    verdict,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::layout::LayoutMode;

    fn image_urls() -> PublicImageUrls {
        PublicImageUrls::new(
            "https://example.supabase.co".to_string(),
            "quiz-images".to_string(),
        )
    }

    fn question(number: u32, options: [&str; 5], answer: u8) -> Question {
        Question {
            round: "60".to_string(),
            number,
            options: options.map(str::to_string),
            answer,
        }
    }

    fn loaded_session(questions: Vec<Question>) -> QuizSession {
        let mut session = QuizSession::new(image_urls());
        session.questions_loaded(Ok(questions));
        session
    }

    #[test]
    fn test_empty_bank_is_terminal() {
        let session = loaded_session(Vec::new());

        assert_eq!(*session.phase(), SessionPhase::Empty);
        assert_eq!(session.current_index, None);
        assert!(session.available_pool.is_empty());
        assert_eq!(session.snapshot(), SessionSnapshot::Empty);
    }

    #[test]
    fn test_failed_load_collapses_to_empty() {
        let mut session = QuizSession::new(image_urls());
        session.questions_loaded(Err(StoreError::Decode("bad rows".to_string())));

        assert_eq!(*session.phase(), SessionPhase::Empty);
        assert_eq!(session.snapshot(), SessionSnapshot::Empty);
    }

    #[test]
    fn test_successful_load_shows_a_question() {
        let session = loaded_session(vec![question(1, ["갑", "을", "병", "정", "무"], 3)]);

        assert_eq!(*session.phase(), SessionPhase::AwaitingAnswer);
        assert_eq!(session.current_index, Some(0));
        assert!(session.available_pool.is_empty());
    }

    #[test]
    fn test_submission_is_gated_on_image_and_selection() {
        let mut session = loaded_session(vec![question(1, ["갑", "을", "병", "정", "무"], 3)]);

        // No selection, image not ready.
        assert!(!session.handle_event(ClientToServerMessage::SubmitAnswer));
        assert_eq!(*session.phase(), SessionPhase::AwaitingAnswer);

        // Selection alone is not enough before the image is ready.
        assert!(session.handle_event(ClientToServerMessage::SelectOption {
            option: "3".to_string(),
        }));
        assert!(!session.handle_event(ClientToServerMessage::SubmitAnswer));
        assert_eq!(*session.phase(), SessionPhase::AwaitingAnswer);

        assert!(session.handle_event(ClientToServerMessage::ImageLoaded));
        assert!(session.handle_event(ClientToServerMessage::SubmitAnswer));
        match session.phase() {
            SessionPhase::Graded(verdict) => assert!(verdict.is_correct),
            other => panic!("expected Graded, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let mut session = loaded_session(vec![question(1, ["갑", "을", "병", "정", "무"], 3)]);

        assert!(!session.handle_event(ClientToServerMessage::SelectOption {
            option: "6".to_string(),
        }));
        assert_eq!(session.selected_option, None);
    }

    #[test]
    fn test_advance_clears_per_question_state() {
        let mut session = loaded_session(vec![question(1, ["갑", "을", "병", "정", "무"], 2)]);

        session.handle_event(ClientToServerMessage::ImageLoaded);
        session.handle_event(ClientToServerMessage::SelectOption {
            option: "1".to_string(),
        });
        session.handle_event(ClientToServerMessage::SubmitAnswer);
        assert!(matches!(session.phase(), SessionPhase::Graded(_)));

        // NextQuestion is only valid from Graded; it resets selection,
        // verdict and the image gate.
        assert!(session.handle_event(ClientToServerMessage::NextQuestion));
        assert_eq!(*session.phase(), SessionPhase::AwaitingAnswer);
        assert_eq!(session.selected_option, None);
        assert!(!session.image_ready);
    }

    #[test]
    fn test_next_is_ignored_before_grading() {
        let mut session = loaded_session(vec![question(1, ["갑", "을", "병", "정", "무"], 2)]);

        assert!(!session.handle_event(ClientToServerMessage::NextQuestion));
        assert_eq!(*session.phase(), SessionPhase::AwaitingAnswer);
    }

    #[test]
    fn test_pool_cycles_through_the_whole_bank() {
        let mut session = loaded_session(vec![
            question(1, ["갑", "을", "병", "정", "무"], 1),
            question(2, ["갑", "을", "병", "정", "무"], 2),
            question(3, ["갑", "을", "병", "정", "무"], 3),
        ]);
        assert_eq!(session.available_pool.len(), 2);

        let mut shown = vec![session.current_index.unwrap()];
        for _ in 0..2 {
            session.handle_event(ClientToServerMessage::ImageLoaded);
            session.handle_event(ClientToServerMessage::SelectOption {
                option: "1".to_string(),
            });
            session.handle_event(ClientToServerMessage::SubmitAnswer);
            session.handle_event(ClientToServerMessage::NextQuestion);
            shown.push(session.current_index.unwrap());
        }

        // One full cycle shows every question exactly once.
        shown.sort_unstable();
        assert_eq!(shown, vec![0, 1, 2]);
        assert!(session.available_pool.is_empty());

        // The next advance refills the pool with the full index range.
        session.handle_event(ClientToServerMessage::ImageLoaded);
        session.handle_event(ClientToServerMessage::SelectOption {
            option: "1".to_string(),
        });
        session.handle_event(ClientToServerMessage::SubmitAnswer);
        session.handle_event(ClientToServerMessage::NextQuestion);
        assert_eq!(session.available_pool.len(), 2);
    }

    #[test]
    fn test_snapshot_resolves_image_options_individually() {
        let mut session = loaded_session(vec![question(
            7,
            ["img1.png", "을", "병", "정", "무"],
            1,
        )]);
        session.handle_event(ClientToServerMessage::ImageLoaded);

        let SessionSnapshot::Question(view) = session.snapshot() else {
            panic!("expected a question snapshot");
        };

        assert_eq!(view.layout, LayoutMode::ImageGrid);
        assert_eq!(view.round, "60");
        assert_eq!(view.number, 7);
        assert_eq!(
            view.image_url,
            "https://example.supabase.co/storage/v1/object/public/quiz-images/60/q7.png"
        );
        assert!(view.image_ready);
        assert_eq!(view.options.len(), 5);

        let first = &view.options[0];
        assert!(first.is_image);
        assert_eq!(first.text, None);
        assert_eq!(
            first.image_url.as_deref(),
            Some("https://example.supabase.co/storage/v1/object/public/quiz-images/60/img1.png")
        );

        let second = &view.options[1];
        assert!(!second.is_image);
        assert_eq!(second.text.as_deref(), Some("을"));
        assert_eq!(second.image_url, None);
    }

    #[test]
    fn test_graded_snapshot_carries_the_verdict() {
        let mut session = loaded_session(vec![question(1, ["갑", "을", "병", "정", "무"], 4)]);
        session.handle_event(ClientToServerMessage::ImageLoaded);
        session.handle_event(ClientToServerMessage::SelectOption {
            option: "2".to_string(),
        });
        session.handle_event(ClientToServerMessage::SubmitAnswer);

        let SessionSnapshot::Question(view) = session.snapshot() else {
            panic!("expected a question snapshot");
        };
        let verdict = view.verdict.expect("graded snapshot must carry a verdict");
        assert!(!verdict.is_correct);
        assert!(verdict.message.contains('4'));
    }
}
