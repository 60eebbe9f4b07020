//! GenerationClient trait definition

use async_trait::async_trait;

use crate::domain::{ItineraryItem, PointOfInterest, QuizQuestion};

use super::GenerationError;

/// Stateless content-generation client - each call is independent
///
/// This is the seam between the planning engine and the opaque
/// generation backend. Callers must not assume anything about result
/// counts, and must reconcile route responses defensively (the backend
/// may drop or invent ids).
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate a trivia quiz for a city
    async fn generate_quiz(&self, city: &str) -> Result<Vec<QuizQuestion>, GenerationError>;

    /// Generate points of interest for a city, personalized by quiz
    /// topics and framed by proximity to the hotel (or "City Center"
    /// when the hotel is empty)
    async fn generate_suggestions(
        &self,
        city: &str,
        topics: &[String],
        hotel: &str,
    ) -> Result<Vec<PointOfInterest>, GenerationError>;

    /// Propose a visiting order as a sequence of item ids
    async fn optimize_route(
        &self,
        city: &str,
        hotel: &str,
        items: &[ItineraryItem],
    ) -> Result<Vec<String>, GenerationError>;

    /// Best-effort lookup of an image for a place. Absence is not an
    /// error.
    async fn enrich_image(&self, title: &str, city: &str) -> Result<Option<String>, GenerationError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::Category;

    /// Mock generation client for unit tests
    pub struct MockGenerationClient {
        quiz: Vec<QuizQuestion>,
        suggestions: Vec<PointOfInterest>,
        route: Vec<String>,
        image: Option<String>,
        fail: bool,
        quiz_calls: AtomicUsize,
        suggestion_calls: AtomicUsize,
    }

    impl MockGenerationClient {
        pub fn new(quiz: Vec<QuizQuestion>, suggestions: Vec<PointOfInterest>) -> Self {
            Self {
                quiz,
                suggestions,
                route: Vec::new(),
                image: None,
                fail: false,
                quiz_calls: AtomicUsize::new(0),
                suggestion_calls: AtomicUsize::new(0),
            }
        }

        /// A client whose every call fails
        pub fn failing() -> Self {
            let mut client = Self::new(Vec::new(), Vec::new());
            client.fail = true;
            client
        }

        pub fn with_route(mut self, route: Vec<String>) -> Self {
            self.route = route;
            self
        }

        pub fn with_image(mut self, url: impl Into<String>) -> Self {
            self.image = Some(url.into());
            self
        }

        pub fn quiz_calls(&self) -> usize {
            self.quiz_calls.load(Ordering::SeqCst)
        }

        pub fn suggestion_calls(&self) -> usize {
            self.suggestion_calls.load(Ordering::SeqCst)
        }

        fn check_fail(&self) -> Result<(), GenerationError> {
            if self.fail {
                Err(GenerationError::InvalidResponse("mock failure".to_string()))
            } else {
                Ok(())
            }
        }

        /// Canned question sets for tests
        pub fn sample_quiz() -> Vec<QuizQuestion> {
            vec![QuizQuestion {
                id: "q-0".to_string(),
                text: "Which river crosses the city?".to_string(),
                options: vec!["Seine".into(), "Thames".into(), "Tiber".into(), "Danube".into()],
                correct_index: 0,
                related_topic: "Rivers".to_string(),
                fun_fact: "The river floods roughly once a century.".to_string(),
            }]
        }

        /// Canned suggestion sets for tests
        pub fn sample_suggestions(ids: &[&str]) -> Vec<PointOfInterest> {
            ids.iter()
                .map(|id| PointOfInterest {
                    id: id.to_string(),
                    title: format!("Place {}", id),
                    description: "A generated place".to_string(),
                    category: Category::Sightseeing,
                    related_quiz_topic: Some("Rivers".to_string()),
                    nearby_interest: None,
                    nearby_interest_description: None,
                    distance_text: Some("1.2 km".to_string()),
                    travel_time_text: Some("15 min".to_string()),
                    coordinates: None,
                    maps_link: None,
                    image_url: None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl GenerationClient for MockGenerationClient {
        async fn generate_quiz(&self, _city: &str) -> Result<Vec<QuizQuestion>, GenerationError> {
            self.quiz_calls.fetch_add(1, Ordering::SeqCst);
            self.check_fail()?;
            Ok(self.quiz.clone())
        }

        async fn generate_suggestions(
            &self,
            _city: &str,
            _topics: &[String],
            _hotel: &str,
        ) -> Result<Vec<PointOfInterest>, GenerationError> {
            self.suggestion_calls.fetch_add(1, Ordering::SeqCst);
            self.check_fail()?;
            Ok(self.suggestions.clone())
        }

        async fn optimize_route(
            &self,
            _city: &str,
            _hotel: &str,
            _items: &[ItineraryItem],
        ) -> Result<Vec<String>, GenerationError> {
            self.check_fail()?;
            Ok(self.route.clone())
        }

        async fn enrich_image(&self, _title: &str, _city: &str) -> Result<Option<String>, GenerationError> {
            self.check_fail()?;
            Ok(self.image.clone())
        }
    }
}
