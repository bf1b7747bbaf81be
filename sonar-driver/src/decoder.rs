use crate::config::RadarConfig;
use crate::constants::SWEEP_PERIOD;
use crate::numeric::{parse_rounded, triangular_fold};
use crate::tokenizer::Token;
use sonar_data::DistanceSample;
use std::fmt;
use std::time::SystemTime;

/// Why a token produced no sample.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Rejection {
    /// Two delimiters in a row or whitespace only.
    Empty,
    NotNumeric(String),
    TooClose(i64),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rejection::Empty => write!(f, "empty token"),
            Rejection::NotNumeric(text) => write!(f, "not a number: {:?}", text),
            Rejection::TooClose(d) => write!(f, "distance too small: {}", d),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub accepted: u64,
    pub clamped: u64,
    pub rejected: u64,
}

/// Turns tokens into samples and owns the sweep counter.
///
/// The counter advances once per non-empty token whether or not it yields a
/// sample, so the synthesized sweep stays phase-continuous across noise.
pub struct SampleDecoder {
    counter: u32,
    min_distance_cm: u16,
    max_distance_cm: u16,
    stats: DecodeStats,
}

impl SampleDecoder {
    pub fn new(min_distance_cm: u16, max_distance_cm: u16) -> SampleDecoder {
        SampleDecoder {
            counter: 0,
            min_distance_cm,
            max_distance_cm,
            stats: DecodeStats::default(),
        }
    }

    pub fn from_config(config: &RadarConfig) -> SampleDecoder {
        SampleDecoder::new(config.min_distance_cm, config.max_distance_cm)
    }

    /// Angle the next decoded reading will be assigned.
    pub fn current_angle(&self) -> u16 {
        triangular_fold(self.counter)
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    pub fn decode(&mut self, token: &Token) -> Option<DistanceSample> {
        self.decode_at(token, SystemTime::now())
    }

    pub fn decode_at(&mut self, token: &Token, now: SystemTime) -> Option<DistanceSample> {
        match self.try_decode(token, now) {
            Ok(sample) => {
                self.stats.accepted += 1;
                Some(sample)
            }
            Err(Rejection::Empty) => None,
            Err(rejection) => {
                self.stats.rejected += 1;
                log::debug!("Rejected reading: {}", rejection);
                None
            }
        }
    }

    fn try_decode(&mut self, token: &Token, now: SystemTime) -> Result<DistanceSample, Rejection> {
        let bytes = token.as_bytes().trim_ascii();
        if bytes.is_empty() {
            return Err(Rejection::Empty);
        }

        let angle_deg = self.advance();
        let text = std::str::from_utf8(bytes)
            .map_err(|_| Rejection::NotNumeric(String::from_utf8_lossy(bytes).into_owned()))?;
        let distance = parse_rounded(text).ok_or_else(|| Rejection::NotNumeric(text.to_string()))?;
        if distance < self.min_distance_cm as i64 {
            return Err(Rejection::TooClose(distance));
        }
        let distance_cm = if distance > self.max_distance_cm as i64 {
            log::debug!("Distance too large: {}, clamping to {}", distance, self.max_distance_cm);
            self.stats.clamped += 1;
            self.max_distance_cm
        } else {
            distance as u16
        };

        Ok(DistanceSample {
            timestamp: now,
            angle_deg,
            distance_cm,
        })
    }

    /// Returns the angle for the current counter value, then steps the counter.
    fn advance(&mut self) -> u16 {
        let angle = triangular_fold(self.counter);
        self.counter = (self.counter + 1) % SWEEP_PERIOD;
        angle
    }
}
