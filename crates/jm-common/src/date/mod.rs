pub mod tenure;

pub use tenure::{effective_experience_years, parse_profile_date, total_experience_years};
