use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SubgenError};
use crate::segment::{Alternative, RecognitionResult, Word};

// Structs for parsing the speech service's long-running recognize response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeResponse {
    #[serde(default)]
    pub results: Vec<SpeechRecognitionResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRecognitionResult {
    #[serde(default)]
    pub alternatives: Vec<SpeechRecognitionAlternative>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub result_end_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRecognitionAlternative {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub words: Vec<WordInfo>,
}

/// Zero offsets are omitted from the service's JSON, hence the defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordInfo {
    pub word: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// Parse a recognize response document into recognition results
pub fn parse_response(json: &str) -> Result<Vec<RecognitionResult>> {
    let response: RecognizeResponse = serde_json::from_str(json)?;
    response.into_results()
}

impl RecognizeResponse {
    /// Convert to recognition results, keeping the service's ordering
    pub fn into_results(self) -> Result<Vec<RecognitionResult>> {
        self.results
            .into_iter()
            .map(|result| {
                let alternatives = result
                    .alternatives
                    .into_iter()
                    .map(|alternative| {
                        let words = alternative
                            .words
                            .into_iter()
                            .map(|info| {
                                Ok(Word {
                                    start: parse_offset(info.start_time.as_deref())?,
                                    end: parse_offset(info.end_time.as_deref())?,
                                    text: info.word,
                                })
                            })
                            .collect::<Result<Vec<_>>>()?;

                        Ok(Alternative {
                            transcript: alternative.transcript,
                            confidence: alternative.confidence,
                            words,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(RecognitionResult { alternatives })
            })
            .collect()
    }
}

/// Parse a duration offset such as "1.500s"; a missing offset is zero
///
/// Decimal seconds are read digit by digit so offsets stay exact to the
/// nanosecond.
pub fn parse_offset(offset: Option<&str>) -> Result<Duration> {
    let Some(offset) = offset else {
        return Ok(Duration::ZERO);
    };

    let invalid = || SubgenError::Recognition(format!("Invalid time offset '{}'", offset));

    let value = offset.trim().trim_end_matches('s');
    let (seconds, fraction) = value.split_once('.').unwrap_or((value, ""));
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());

    if (seconds.is_empty() && fraction.is_empty()) || !all_digits(seconds) || !all_digits(fraction) {
        return Err(invalid());
    }

    let seconds: u64 = if seconds.is_empty() {
        0
    } else {
        seconds.parse().map_err(|_| invalid())?
    };

    // Digits past nanosecond precision are truncated
    let fraction: String = fraction.chars().take(9).collect();
    let nanos: u32 = format!("{:0<9}", fraction).parse().map_err(|_| invalid())?;

    Ok(Duration::new(seconds, nanos))
}
