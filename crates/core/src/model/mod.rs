mod high_score;
mod ids;
mod module;
mod percent;
mod principal;
mod progress;
mod question;

pub use high_score::HighScoreRecord;
pub use ids::UserId;
pub use module::{ModuleKey, ParseModuleKeyError};
pub use percent::{Percent, PercentError};
pub use principal::Principal;
pub use progress::ProgressRecord;
pub use question::{Answer, Question, QuestionError};
