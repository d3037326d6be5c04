use super::{Completion, Screen};

use futures::FutureExt;

use crate::entities::{SessionToken, Suggestion};

impl Screen {
    #[tracing::instrument(skip(self))]
    pub(super) fn on_query_changed(&mut self, text: String) {
        self.query_seq += 1;
        let seq = self.query_seq;

        if text.chars().count() < self.config.query_threshold {
            self.replace_suggestions(Vec::new());
            return;
        }

        let places = self.places.clone();
        let session_token = self.session_token();

        self.spawn_completion(
            async move {
                let suggestions = match places.autocomplete(text, session_token).await {
                    Ok(suggestions) => Some(suggestions),
                    Err(err) => {
                        tracing::error!(%err, "autocomplete request failed");
                        None
                    }
                };

                Completion::Suggestions { seq, suggestions }
            }
            .boxed(),
        );
    }

    pub(super) fn on_suggestions(&mut self, seq: u64, suggestions: Option<Vec<Suggestion>>) {
        if seq != self.query_seq {
            tracing::debug!(seq, latest = self.query_seq, "discarding superseded suggestions");
            return;
        }

        if let Some(suggestions) = suggestions {
            self.replace_suggestions(suggestions);
        }
    }

    fn replace_suggestions(&mut self, suggestions: Vec<Suggestion>) {
        self.suggestions = suggestions;
        self.view.set_suggestions(&self.suggestions);
    }

    // one token spans the keystrokes of a search until a place is fetched
    fn session_token(&mut self) -> SessionToken {
        self.session.get_or_insert_with(SessionToken::new).clone()
    }

    pub(super) fn end_session(&mut self) -> SessionToken {
        self.session.take().unwrap_or_default()
    }
}
