// Tone envelope - linear attack then linear decay to silence
//
// Shape of every scheduled tone:
//
//   gain
//   peak |  /\
//        | /   \
//        |/      \
//      0 +--------\---- t
//        0  attack  duration

/// Gain envelope of one tone, evaluated by time since the tone started
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneEnvelope {
    /// Seconds to reach the peak
    attack: f64,
    /// Seconds until the gain is back to 0 and the tone stops
    duration: f64,
    peak: f32,
}

impl ToneEnvelope {
    pub fn new(attack: f64, duration: f64, peak: f32) -> Self {
        Self {
            attack: attack.max(0.0),
            duration: duration.max(0.0),
            peak: peak.clamp(0.0, 1.0),
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn peak(&self) -> f32 {
        self.peak
    }

    /// Gain `elapsed` seconds after the tone started
    ///
    /// Tones shorter than the attack are cut during their rise.
    pub fn gain_at(&self, elapsed: f64) -> f32 {
        if elapsed < 0.0 || elapsed >= self.duration {
            return 0.0;
        }

        let peak = self.peak as f64;
        let gain = if elapsed < self.attack {
            peak * elapsed / self.attack
        } else {
            let decay = self.duration - self.attack;
            peak * (1.0 - (elapsed - self.attack) / decay)
        };

        gain as f32
    }

    /// True once the tone has run its full length
    pub fn is_finished(&self, elapsed: f64) -> bool {
        elapsed >= self.duration
    }
}
