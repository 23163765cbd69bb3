use serde::{Deserialize, Serialize};

/// Named pheromone channel. Each colony owns one grid per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// "Home is this way", laid by searching workers and seeded at the nest.
    Home,
    /// "Food is this way", laid by workers carrying food back.
    Harvest,
    /// Recruitment signal laid by army agents engaging an enemy.
    Attack,
    /// Short-lived warning laid by agents that took damage.
    Danger,
}

impl Channel {
    pub const COUNT: usize = 4;
    pub const ALL: [Channel; Channel::COUNT] = [
        Channel::Home,
        Channel::Harvest,
        Channel::Attack,
        Channel::Danger,
    ];

    #[inline(always)]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Channel::Home => 0,
            Channel::Harvest => 1,
            Channel::Attack => 2,
            Channel::Danger => 3,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Channel::Home => "home",
            Channel::Harvest => "harvest",
            Channel::Attack => "attack",
            Channel::Danger => "danger",
        }
    }
}
