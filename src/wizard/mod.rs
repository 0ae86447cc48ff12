//! The wizard engine: form state, history, navigation, and sessions.

pub mod form;
pub mod history;
pub mod manager;
pub mod navigator;
pub mod session;
pub mod validate;

pub use form::{AnswerValue, FormData};
pub use history::StepHistory;
pub use manager::{SessionManager, StepView, WizardStats};
pub use navigator::StepNavigator;
pub use session::{StepOutcome, WizardSession};
