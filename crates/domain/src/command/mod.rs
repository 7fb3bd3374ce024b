//! Free-text command grammar.
//!
//! A command is recognised by an ordered list of [`Rule`]s evaluated top to
//! bottom; the first rule returning a [`Command`] wins. Rule order encodes
//! priority, so "sab band" beats any device rule and light 2 is tried before
//! the generic light 1 fallback.
//!
//! Interpretation never fails: unrecognised text yields `None`, meaning the
//! message should be handed to the language model.

pub mod duration;
pub mod vocabulary;

use crate::device::Device;
use crate::timer::TimerDuration;

use self::duration::find_duration;
use self::vocabulary::{
    BOTH_LIGHTS, CANCEL_WORD, GROUP_OFF_WORD, GROUP_ON_WORDS, GROUP_WORD, OFF_WORDS, ON_WORDS,
    STATUS_WORDS, TIMED_MARKERS, TIMER_QUERY_WORDS, TIMER_WORD, WATER_WORDS, contains_any,
    find_device,
};

/// Requested switch direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    On,
    Off,
}

impl Intent {
    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// `ON` / `OFF`, as used in replies.
    #[must_use]
    pub fn shout(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

/// Normalised user input plus its action flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    text: String,
    wants_on: bool,
    wants_off: bool,
}

impl Utterance {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let text = raw.trim().to_lowercase();
        let wants_on = contains_any(&text, ON_WORDS);
        let wants_off = contains_any(&text, OFF_WORDS);
        Self {
            text,
            wants_on,
            wants_off,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    #[must_use]
    pub fn contains_any(&self, words: &[&str]) -> bool {
        contains_any(&self.text, words)
    }

    /// Switch direction implied by the action words.
    ///
    /// Off wins when both are present: `on` is a substring of words like
    /// "second" and "dono", while off words are never accidental.
    #[must_use]
    pub fn intent(&self) -> Option<Intent> {
        if self.wants_off {
            Some(Intent::Off)
        } else if self.wants_on {
            Some(Intent::On)
        } else {
            None
        }
    }

    #[must_use]
    pub fn has_action(&self) -> bool {
        self.wants_on || self.wants_off
    }
}

/// Action recognised from an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Every relay off.
    AllOff,
    /// Lights and fan on; the extra outlet is left alone.
    AllOn,
    WaterStatus,
    SystemStatus,
    /// Schedule `device` to switch off after `duration`, optionally
    /// switching it on right now.
    Timed {
        device: Device,
        duration: TimerDuration,
        switch_on_now: bool,
    },
    TimerStatus,
    /// `None` when the text names no device.
    CancelTimer { device: Option<Device> },
    BothLights(Intent),
    Switch { device: Device, intent: Intent },
}

/// One entry of the grammar.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub matcher: fn(&Utterance) -> Option<Command>,
}

/// The grammar, in evaluation order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "group_off",
        matcher: group_off,
    },
    Rule {
        name: "group_on",
        matcher: group_on,
    },
    Rule {
        name: "status_without_action",
        matcher: status_without_action,
    },
    Rule {
        name: "timed",
        matcher: timed,
    },
    Rule {
        name: "timer_status",
        matcher: timer_status,
    },
    Rule {
        name: "cancel_timer",
        matcher: cancel_timer,
    },
    Rule {
        name: "both_lights",
        matcher: both_lights,
    },
    Rule {
        name: "light2",
        matcher: light2,
    },
    Rule {
        name: "light1",
        matcher: light1,
    },
    Rule {
        name: "fan",
        matcher: fan,
    },
    Rule {
        name: "extra",
        matcher: extra,
    },
    Rule {
        name: "water",
        matcher: water,
    },
    Rule {
        name: "system_status",
        matcher: system_status,
    },
];

/// Run the grammar over `text`, returning the first matching rule and its
/// command.
#[must_use]
pub fn interpret_with_rule(text: &str) -> Option<(&'static Rule, Command)> {
    let utterance = Utterance::new(text);
    RULES
        .iter()
        .find_map(|rule| (rule.matcher)(&utterance).map(|command| (rule, command)))
}

/// Run the grammar over `text`.
#[must_use]
pub fn interpret(text: &str) -> Option<Command> {
    interpret_with_rule(text).map(|(_, command)| command)
}

fn group_off(u: &Utterance) -> Option<Command> {
    (u.contains(GROUP_WORD) && u.contains(GROUP_OFF_WORD)).then_some(Command::AllOff)
}

fn group_on(u: &Utterance) -> Option<Command> {
    (u.contains(GROUP_WORD) && u.contains_any(GROUP_ON_WORDS)).then_some(Command::AllOn)
}

/// Pure questions route straight to the status answers. Timer phrases are
/// excluded so "timer status" reaches the timer rules.
fn status_without_action(u: &Utterance) -> Option<Command> {
    if u.has_action() || u.contains(TIMER_WORD) {
        return None;
    }
    water(u).or_else(|| system_status(u))
}

fn timed(u: &Utterance) -> Option<Command> {
    if !u.contains_any(TIMED_MARKERS) {
        return None;
    }
    let duration = find_duration(u.text())?;
    let device = find_device(u.text())?;
    Some(Command::Timed {
        device,
        duration,
        switch_on_now: u.intent() == Some(Intent::On),
    })
}

fn timer_status(u: &Utterance) -> Option<Command> {
    (u.contains(TIMER_WORD) && u.contains_any(TIMER_QUERY_WORDS)).then_some(Command::TimerStatus)
}

fn cancel_timer(u: &Utterance) -> Option<Command> {
    (u.contains(CANCEL_WORD) && u.contains(TIMER_WORD)).then(|| Command::CancelTimer {
        device: find_device(u.text()),
    })
}

fn both_lights(u: &Utterance) -> Option<Command> {
    if !u.contains_any(BOTH_LIGHTS) {
        return None;
    }
    u.intent().map(Command::BothLights)
}

fn switch_if(u: &Utterance, device: Device, mentioned: bool) -> Option<Command> {
    if !mentioned {
        return None;
    }
    u.intent().map(|intent| Command::Switch { device, intent })
}

fn light2(u: &Utterance) -> Option<Command> {
    switch_if(u, Device::Light2, vocabulary::mentions_light2(u.text()))
}

fn light1(u: &Utterance) -> Option<Command> {
    switch_if(u, Device::Light1, vocabulary::mentions_light1(u.text()))
}

fn fan(u: &Utterance) -> Option<Command> {
    switch_if(u, Device::Fan, vocabulary::mentions_fan(u.text()))
}

fn extra(u: &Utterance) -> Option<Command> {
    switch_if(u, Device::Extra, vocabulary::mentions_extra(u.text()))
}

fn water(u: &Utterance) -> Option<Command> {
    u.contains_any(WATER_WORDS).then_some(Command::WaterStatus)
}

fn system_status(u: &Utterance) -> Option<Command> {
    u.contains_any(STATUS_WORDS).then_some(Command::SystemStatus)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_name(text: &str) -> Option<&'static str> {
        interpret_with_rule(text).map(|(rule, _)| rule.name)
    }

    #[test]
    fn should_turn_everything_off_when_sab_and_band_present() {
        for text in [
            "sab band karo",
            "SAB BAND",
            "sab light band kar do and fan on for 10 minutes",
            "turn on sab ... band",
        ] {
            assert_eq!(interpret(text), Some(Command::AllOff), "{text}");
        }
    }

    #[test]
    fn should_turn_lights_and_fan_on_when_sab_chalu() {
        assert_eq!(interpret("sab chalu karo"), Some(Command::AllOn));
        assert_eq!(interpret("sab on"), Some(Command::AllOn));
    }

    #[test]
    fn should_schedule_off_timer_and_switch_on_when_timed_on_command() {
        assert_eq!(
            interpret("turn on fan for 30 minutes"),
            Some(Command::Timed {
                device: Device::Fan,
                duration: TimerDuration::new(0, 30, 0),
                switch_on_now: true,
            })
        );
    }

    #[test]
    fn should_only_schedule_when_timed_command_has_no_on_word() {
        assert_eq!(
            interpret("light 2 off after 1 hour"),
            Some(Command::Timed {
                device: Device::Light2,
                duration: TimerDuration::new(1, 0, 0),
                switch_on_now: false,
            })
        );
    }

    #[test]
    fn should_fall_through_to_switch_when_timed_command_has_no_duration() {
        assert_eq!(
            interpret("turn on the fan for me"),
            Some(Command::Switch {
                device: Device::Fan,
                intent: Intent::On,
            })
        );
    }

    #[test]
    fn should_query_timers_when_timer_status_asked() {
        assert_eq!(interpret("timer status"), Some(Command::TimerStatus));
        assert_eq!(interpret("what timers are active?"), Some(Command::TimerStatus));
    }

    #[test]
    fn should_cancel_timer_for_named_device() {
        assert_eq!(
            interpret("cancel light 1 timer"),
            Some(Command::CancelTimer {
                device: Some(Device::Light1),
            })
        );
    }

    #[test]
    fn should_cancel_without_device_when_none_named() {
        assert_eq!(
            interpret("cancel the timer"),
            Some(Command::CancelTimer { device: None })
        );
    }

    #[test]
    fn should_switch_both_lights_together() {
        assert_eq!(
            interpret("turn on all lights"),
            Some(Command::BothLights(Intent::On))
        );
        assert_eq!(
            interpret("dono light bujha do"),
            Some(Command::BothLights(Intent::Off))
        );
    }

    #[test]
    fn should_let_off_win_when_on_hides_inside_another_word() {
        for text in ["turn off second light", "dono light band karo", "fan off, not on"] {
            let utterance = Utterance::new(text);
            assert!(utterance.has_action(), "{text}");
            assert_eq!(utterance.intent(), Some(Intent::Off), "{text}");
        }
        assert_eq!(Utterance::new("second light on").intent(), Some(Intent::On));
    }

    #[test]
    fn should_prefer_light2_over_generic_light() {
        assert_eq!(
            interpret("turn off second light"),
            Some(Command::Switch {
                device: Device::Light2,
                intent: Intent::Off,
            })
        );
        assert_eq!(rule_name("light 2 on"), Some("light2"));
    }

    #[test]
    fn should_switch_light1_when_generic_light() {
        assert_eq!(
            interpret("light jala do"),
            Some(Command::Switch {
                device: Device::Light1,
                intent: Intent::On,
            })
        );
    }

    #[test]
    fn should_switch_extra_device() {
        assert_eq!(
            interpret("relay 4 stop"),
            Some(Command::Switch {
                device: Device::Extra,
                intent: Intent::Off,
            })
        );
    }

    #[test]
    fn should_answer_status_questions_without_action_words() {
        assert_eq!(interpret("how much pani is left?"), Some(Command::WaterStatus));
        assert_eq!(interpret("system"), Some(Command::SystemStatus));
        assert_eq!(rule_name("water level"), Some("status_without_action"));
    }

    #[test]
    fn should_reach_late_status_rules_when_action_word_without_device() {
        assert_eq!(rule_name("start the water report"), Some("water"));
    }

    #[test]
    fn should_return_none_for_device_without_action() {
        assert_eq!(interpret("fan"), None);
    }

    #[test]
    fn should_return_none_when_nothing_matches() {
        assert_eq!(interpret("tell me a joke"), None);
        assert_eq!(interpret(""), None);
    }
}
