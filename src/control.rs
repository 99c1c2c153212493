use crate::error::SessionError;
use crate::game::Side;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which sides have their moves chosen automatically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    #[default]
    None,
    Sente,
    Gote,
    Both,
}

impl Control {
    /// Automate exactly `side`
    pub fn for_side(side: Side) -> Control {
        match side {
            Side::Sente => Control::Sente,
            Side::Gote => Control::Gote,
        }
    }

    pub fn includes(&self, side: Side) -> bool {
        matches!(
            (self, side),
            (Control::Both, _) | (Control::Sente, Side::Sente) | (Control::Gote, Side::Gote)
        )
    }

    fn with(self, side: Side) -> Control {
        match (self, side) {
            (Control::None, side) => Control::for_side(side),
            (Control::Sente, Side::Gote) | (Control::Gote, Side::Sente) => Control::Both,
            (unchanged, _) => unchanged,
        }
    }

    /// Parse side letters as given on the command line: `s`/`b` for Sente,
    /// `g`/`w` for Gote, in any combination.
    pub fn from_letters(letters: &str) -> Result<Control, char> {
        letters.chars().try_fold(Control::None, |control, c| {
            match c.to_ascii_lowercase() {
                's' | 'b' => Ok(control.with(Side::Sente)),
                'g' | 'w' => Ok(control.with(Side::Gote)),
                _ => Err(c),
            }
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Control::None => "none",
            Control::Sente => "sente",
            Control::Gote => "gote",
            Control::Both => "both",
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Control {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Control::None),
            "sente" => Ok(Control::Sente),
            "gote" => Ok(Control::Gote),
            "both" => Ok(Control::Both),
            other => Err(format!("unknown control: {}", other)),
        }
    }
}

/// Who plays automatically, and how strongly
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerControl {
    control: Control,
    strengths: [f64; 2],
}

impl PlayerControl {
    pub fn new(control: Control) -> Self {
        PlayerControl {
            control,
            strengths: [1.0; 2],
        }
    }

    pub fn control(&self) -> Control {
        self.control
    }

    pub fn set_control(&mut self, control: Control) {
        self.control = control;
    }

    pub fn is_automated(&self, side: Side) -> bool {
        self.control.includes(side)
    }

    pub fn strength(&self, side: Side) -> f64 {
        self.strengths[side.index()]
    }

    /// Set both sides to the same strength
    pub fn set_strength(&mut self, strength: f64) -> Result<(), SessionError> {
        self.set_strengths(strength, strength)
    }

    pub fn set_strengths(&mut self, sente: f64, gote: f64) -> Result<(), SessionError> {
        // written so that NaN fails too
        for value in [sente, gote] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(SessionError::InvalidStrength(value));
            }
        }

        self.strengths = [sente, gote];
        Ok(())
    }
}

impl Default for PlayerControl {
    fn default() -> Self {
        Self::new(Control::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_automated() {
        let mut players = PlayerControl::default();
        assert!(!players.is_automated(Side::Sente));
        assert!(!players.is_automated(Side::Gote));

        players.set_control(Control::Gote);
        assert!(!players.is_automated(Side::Sente));
        assert!(players.is_automated(Side::Gote));

        players.set_control(Control::Both);
        assert!(players.is_automated(Side::Sente));
        assert!(players.is_automated(Side::Gote));

        players.set_control(Control::None);
        assert!(!players.is_automated(Side::Gote));
    }

    #[test]
    fn test_strengths_default_to_one() {
        let players = PlayerControl::default();
        assert_eq!(players.strength(Side::Sente), 1.0);
        assert_eq!(players.strength(Side::Gote), 1.0);
    }

    #[test]
    fn test_set_one_strength_sets_both() {
        let mut players = PlayerControl::default();

        assert_eq!(players.set_strength(2.5), Ok(()));
        assert_eq!(players.strength(Side::Sente), 2.5);
        assert_eq!(players.strength(Side::Gote), 2.5);
    }

    #[test]
    fn test_set_two_strengths_independently() {
        let mut players = PlayerControl::default();

        assert_eq!(players.set_strengths(0.5, 3.0), Ok(()));
        assert_eq!(players.strength(Side::Sente), 0.5);
        assert_eq!(players.strength(Side::Gote), 3.0);
    }

    #[test]
    fn test_invalid_strengths_are_rejected() {
        let mut players = PlayerControl::default();
        players.set_strengths(2.0, 4.0).unwrap();

        assert_eq!(players.set_strength(0.0), Err(SessionError::InvalidStrength(0.0)));
        assert_eq!(players.set_strength(-1.0), Err(SessionError::InvalidStrength(-1.0)));
        assert!(matches!(
            players.set_strength(f64::NAN),
            Err(SessionError::InvalidStrength(v)) if v.is_nan()
        ));
        assert!(players.set_strengths(1.0, f64::NAN).is_err());
        assert!(players.set_strengths(-3.0, 1.0).is_err());
        assert_eq!(
            players.set_strength(f64::INFINITY),
            Err(SessionError::InvalidStrength(f64::INFINITY))
        );
        assert!(players.set_strengths(1.0, f64::INFINITY).is_err());

        assert_eq!(players.strength(Side::Sente), 2.0);
        assert_eq!(players.strength(Side::Gote), 4.0);
    }

    #[test]
    fn test_control_from_letters() {
        assert_eq!(Control::from_letters(""), Ok(Control::None));
        assert_eq!(Control::from_letters("s"), Ok(Control::Sente));
        assert_eq!(Control::from_letters("W"), Ok(Control::Gote));
        assert_eq!(Control::from_letters("bg"), Ok(Control::Both));
        assert_eq!(Control::from_letters("gg"), Ok(Control::Gote));
        assert_eq!(Control::from_letters("sx"), Err('x'));
    }

    #[test]
    fn test_control_names() {
        assert_eq!("Both".parse::<Control>(), Ok(Control::Both));
        assert_eq!(Control::Gote.to_string(), "gote");
        assert!("white".parse::<Control>().is_err());
    }
}
