pub mod config;
pub mod constants;
pub mod error;
pub mod gemini;
pub mod horoscope;
pub mod web_server;
pub mod zodiac;

pub use config::Settings;
pub use error::{GenerationError, ReadingError, USER_ERROR_MESSAGE};
pub use gemini::{build_prompt, GeminiClient, TextGenerator};
pub use horoscope::{HoroscopeController, Phase, RequestState};
pub use zodiac::{ZodiacSign, ZODIAC_SIGNS};
