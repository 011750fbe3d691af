//! Action resolution: turning an `ActionKind` into score changes.
//!
//! Resolvers never mutate state. They read pre-spin scores from the
//! `GameState`, decide the changes and describe them; the engine then
//! commits the result through `GameState::apply_score_changes`.

use crate::core::{ActionKind, GameRng, GameState, ScoreChanges};

/// Bonus given instead of a loss when the acting team is already at 0.
pub const RUBBER_BAND_BONUS: i64 = 5;

/// Given to a thief when nobody has points to steal.
pub const STEAL_CONSOLATION: i64 = 3;

/// Placeholder reward for a wildcard.
pub const WILDCARD_BONUS: i64 = 5;

/// Given for an unrecognized action kind.
pub const MYSTERY_BONUS: i64 = 5;

/// Score changes and description produced by one action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub score_changes: ScoreChanges,
    pub description: String,
}

impl Resolution {
    fn single(team: &str, delta: i64, description: String) -> Self {
        let mut score_changes = ScoreChanges::new();
        score_changes.insert(team.to_string(), delta);
        Self {
            score_changes,
            description,
        }
    }
}

/// Context an action is resolved in.
pub struct ResolverContext<'a> {
    /// Scores are read from here, never written.
    pub state: &'a GameState,
    /// Points cap; 0 means none.
    pub max_points: i64,
}

/// Resolves wheel actions.
pub struct ActionResolver;

impl ActionResolver {
    /// Resolve `kind` for the acting `team`.
    pub fn resolve(
        kind: &ActionKind,
        team: &str,
        context: &ResolverContext,
        rng: &mut GameRng,
    ) -> Resolution {
        match kind {
            ActionKind::AddFixed(delta) => Self::add_fixed(team, *delta, context),
            ActionKind::Steal(amount) => Self::steal(team, *amount, context, rng),
            ActionKind::ShareAll(delta) => Self::share_all(*delta, context),
            ActionKind::Multiply(factor) => Self::multiply(team, *factor, context),
            ActionKind::Divide(divisor) => Self::divide(team, *divisor, context),
            ActionKind::SwapRandom => Self::swap_random(team, context, rng),
            ActionKind::Wildcard => Resolution::single(
                team,
                WILDCARD_BONUS,
                format!("Wildcard! {team} completes a mini-challenge and gains {WILDCARD_BONUS} points!"),
            ),
            ActionKind::Unknown(_) => Resolution::single(
                team,
                MYSTERY_BONUS,
                format!("{team} gets a mystery bonus: +{MYSTERY_BONUS} points!"),
            ),
        }
    }

    fn score_of(team: &str, context: &ResolverContext) -> i64 {
        context.state.score(team).unwrap_or(0)
    }

    fn add_fixed(team: &str, delta: i64, context: &ResolverContext) -> Resolution {
        // Only the acting team's current score matters here
        if Self::score_of(team, context) <= 0 && delta < 0 {
            return Resolution::single(
                team,
                RUBBER_BAND_BONUS,
                format!(
                    "{team} would lose points but gets +{RUBBER_BAND_BONUS} instead (rubber-band effect)!"
                ),
            );
        }

        let verb = if delta >= 0 { "gains" } else { "loses" };
        Resolution::single(team, delta, format!("{team} {verb} {} points!", delta.unsigned_abs()))
    }

    fn steal(team: &str, amount: i64, context: &ResolverContext, rng: &mut GameRng) -> Resolution {
        let victims: Vec<&String> = context
            .state
            .teams()
            .iter()
            .filter(|other| other.as_str() != team && Self::score_of(other, context) > 0)
            .collect();

        let Some(victim) = rng.choose(&victims).copied() else {
            return Resolution::single(
                team,
                STEAL_CONSOLATION,
                format!(
                    "{team} tried to steal but no one has points! Gets {STEAL_CONSOLATION} consolation points."
                ),
            );
        };

        let stolen = amount.min(Self::score_of(victim, context));
        let mut score_changes = ScoreChanges::new();
        score_changes.insert(team.to_string(), stolen);
        score_changes.insert(victim.clone(), stolen.saturating_neg());

        Resolution {
            score_changes,
            description: format!("{team} steals {stolen} points from {victim}!"),
        }
    }

    fn share_all(delta: i64, context: &ResolverContext) -> Resolution {
        Resolution {
            score_changes: context
                .state
                .teams()
                .iter()
                .map(|team| (team.clone(), delta))
                .collect(),
            description: format!("Everyone gains {delta} points!"),
        }
    }

    fn multiply(team: &str, factor: i64, context: &ResolverContext) -> Resolution {
        let current = Self::score_of(team, context);
        let cap = context.max_points;

        let mut new_score = current.saturating_mul(factor);
        if cap > 0 {
            new_score = new_score.min(cap);
        }

        let description = if cap > 0 && new_score == cap {
            format!("{team} multiplies score by {factor} (capped at {cap})!")
        } else {
            format!("{team} multiplies their score by {factor}!")
        };
        Resolution::single(team, new_score.saturating_sub(current), description)
    }

    fn divide(team: &str, divisor: i64, context: &ResolverContext) -> Resolution {
        let current = Self::score_of(team, context);
        let new_score = div_ceil(current, divisor).max(0);

        Resolution::single(
            team,
            new_score - current,
            format!("{team} divides their score by {divisor}!"),
        )
    }

    fn swap_random(team: &str, context: &ResolverContext, rng: &mut GameRng) -> Resolution {
        let others: Vec<&String> = context
            .state
            .teams()
            .iter()
            .filter(|other| other.as_str() != team)
            .collect();

        let Some(target) = rng.choose(&others).copied() else {
            return Resolution {
                score_changes: ScoreChanges::new(),
                description: format!("{team} tries to swap but there's no other team!"),
            };
        };

        let own = Self::score_of(team, context);
        let theirs = Self::score_of(target, context);

        let mut score_changes = ScoreChanges::new();
        score_changes.insert(team.to_string(), theirs.saturating_sub(own));
        score_changes.insert(target.clone(), own.saturating_sub(theirs));

        Resolution {
            score_changes,
            description: format!("{team} swaps scores with {target}!"),
        }
    }
}

/// Ceiling of `a / b`. `b` must be non-zero.
fn div_ceil(a: i64, b: i64) -> i64 {
    let quotient = a / b;
    if a % b != 0 && ((a < 0) == (b < 0)) {
        quotient + 1
    } else {
        quotient
    }
}
