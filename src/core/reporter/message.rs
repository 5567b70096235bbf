//! Human-readable result messages.

use crate::core::pipeline::Classification;

/// Format a score the way it is shown to users.
///
/// Whole numbers keep one decimal (`100.0`), everything else uses the
/// shortest exact form (`87.53`, `-3.2`).
pub fn format_score(score: f64) -> String {
    if score.is_finite() && score.fract() == 0.0 {
        format!("{:.1}", score)
    } else {
        format!("{}", score)
    }
}

/// The one-line verdict for a comparison
pub fn result_message(score: f64, classification: Classification) -> String {
    let score = format_score(score);
    match classification {
        Classification::Match => {
            format!("Success: Signatures Match! They are {}% similar!", score)
        }
        Classification::NoMatch => {
            format!("Failure: Signatures Do Not Match. They are {}% similar!", score)
        }
    }
}

/// Confirmation shown after a successful upload
pub fn upload_message(name: &str) -> String {
    format!("Signature uploaded successfully under the name '{}'!", name)
}
