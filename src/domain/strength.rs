//! Team strength model for match-winner and goals probabilities.
//!
//! A simplified expected-goals model: each side's attack scaled by recent
//! form and divided by the opponent's defense gives an xG figure, and a
//! logistic on the xG difference splits home/away. The draw share comes
//! from a fixed damping factor and the three values are renormalized.
//! Total xG also drives the over 2.5 goals and both-teams-score shares.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Localised name of the match-winner market the model applies to.
pub const MATCH_WINNER_MARKET: &str = "Resultado Final";

/// Match-winner outcome labels as quoted by the provider.
pub const HOME_LABEL: &str = "Home";
pub const DRAW_LABEL: &str = "Draw";
pub const AWAY_LABEL: &str = "Away";

/// Over/Under market at the 2.5 goals line, and its labels.
pub const GOALS_LINE_MARKET: &str = "Total de Gols 2.5";
pub const OVER_LABEL: &str = "Mais de 2.5";
pub const UNDER_LABEL: &str = "Menos de 2.5";

/// Both-teams-score market and its labels.
pub const BOTH_SCORE_MARKET: &str = "Ambas Marcam";
pub const YES_LABEL: &str = "Sim";
pub const NO_LABEL: &str = "Não";

/// Floor on a side's expected goals.
const MIN_XG: f64 = 0.1;

/// Goals-market shares are kept inside this band.
const MIN_SHARE: f64 = 0.05;
const MAX_SHARE: f64 = 0.95;

/// Markets the model has an opinion on.
pub fn is_model_market(market: &str) -> bool {
    matches!(
        market,
        MATCH_WINNER_MARKET | GOALS_LINE_MARKET | BOTH_SCORE_MARKET
    )
}

/// Season averages for one team.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamStrength {
    /// Goals scored per match.
    pub attack: f64,
    /// Goals conceded per match.
    pub defense: f64,
    /// Points-like form score, at least 1.
    pub form: f64,
}

impl Default for TeamStrength {
    /// Neutral strength used when no statistics are available.
    fn default() -> Self {
        Self {
            attack: 1.0,
            defense: 1.0,
            form: 1.0,
        }
    }
}

impl TeamStrength {
    pub fn new(attack: f64, defense: f64, form: f64) -> Self {
        Self {
            attack,
            defense,
            form,
        }
    }

    /// Build from averages and a form string such as `"WWDLW"`.
    pub fn from_form_string(attack: f64, defense: f64, form: &str) -> Self {
        Self::new(attack, defense, form_score(form))
    }

    fn sanitized(self) -> Self {
        let neutral = Self::default();
        Self {
            attack: if self.attack.is_finite() && self.attack >= 0.0 {
                self.attack
            } else {
                neutral.attack
            },
            defense: if self.defense.is_finite() && self.defense > 0.0 {
                self.defense
            } else {
                neutral.defense
            },
            form: if self.form.is_finite() {
                self.form.max(1.0)
            } else {
                neutral.form
            },
        }
    }
}

/// Two points per win, one per draw, floored at 1.
pub fn form_score(form: &str) -> f64 {
    let points: u32 = form
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            'W' => 2,
            'D' => 1,
            _ => 0,
        })
        .sum();
    f64::from(points.max(1))
}

/// Model output for one fixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchProbabilities {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
    /// More than 2.5 goals.
    pub over_2_5: f64,
    /// Both teams score.
    pub both_score: f64,
    pub home_xg: f64,
    pub away_xg: f64,
}

impl MatchProbabilities {
    /// Probabilities keyed by the match-winner labels, ready for
    /// `OddsValuationEngine::apply_model_adjustment`.
    pub fn as_overrides(&self) -> HashMap<String, f64> {
        HashMap::from([
            (HOME_LABEL.to_string(), self.home),
            (DRAW_LABEL.to_string(), self.draw),
            (AWAY_LABEL.to_string(), self.away),
        ])
    }

    /// Overrides for `market`, or `None` when the model does not price it.
    pub fn overrides_for(&self, market: &str) -> Option<HashMap<String, f64>> {
        match market {
            MATCH_WINNER_MARKET => Some(self.as_overrides()),
            GOALS_LINE_MARKET => Some(HashMap::from([
                (OVER_LABEL.to_string(), self.over_2_5),
                (UNDER_LABEL.to_string(), 1.0 - self.over_2_5),
            ])),
            BOTH_SCORE_MARKET => Some(HashMap::from([
                (YES_LABEL.to_string(), self.both_score),
                (NO_LABEL.to_string(), 1.0 - self.both_score),
            ])),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StrengthModel {
    draw_factor: f64,
}

impl Default for StrengthModel {
    fn default() -> Self {
        Self { draw_factor: 0.65 }
    }
}

impl StrengthModel {
    pub fn new(draw_factor: f64) -> Self {
        Self { draw_factor }
    }

    pub fn draw_factor(&self) -> f64 {
        self.draw_factor
    }

    /// Home/draw/away probabilities summing to 1.0, plus the goals shares.
    pub fn predict(&self, home: TeamStrength, away: TeamStrength) -> MatchProbabilities {
        let home = home.sanitized();
        let away = away.sanitized();

        let home_xg = (home.attack * home.form / away.defense).max(MIN_XG);
        let away_xg = (away.attack * away.form / home.defense).max(MIN_XG);

        let home_win = logistic(home_xg - away_xg);
        let away_win = 1.0 - home_win;
        let draw = (1.0 - self.draw_factor * (home_win + away_win)).abs();

        let total = home_win + draw + away_win;
        let total_xg = home_xg + away_xg;

        MatchProbabilities {
            home: home_win / total,
            draw: draw / total,
            away: away_win / total,
            over_2_5: (total_xg / 3.0).clamp(MIN_SHARE, MAX_SHARE),
            both_score: (total_xg / 2.0).clamp(MIN_SHARE, MAX_SHARE),
            home_xg,
            away_xg,
        }
    }
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_score() {
        assert_eq!(form_score("WWDLW"), 7.0);
        assert_eq!(form_score("LLLL"), 1.0);
        assert_eq!(form_score(""), 1.0);
        assert_eq!(form_score("wd"), 3.0);
    }

    #[test]
    fn test_even_teams() {
        let model = StrengthModel::default();
        let p = model.predict(TeamStrength::default(), TeamStrength::default());
        // home = away = 0.5, draw = 0.35 → total 1.35
        assert!((p.home - 0.5 / 1.35).abs() < 1e-12);
        assert!((p.draw - 0.35 / 1.35).abs() < 1e-12);
        assert!((p.home + p.draw + p.away - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_stronger_home_side_favoured() {
        let model = StrengthModel::default();
        let home = TeamStrength::from_form_string(2.1, 0.8, "WWWDW");
        let away = TeamStrength::from_form_string(1.0, 1.4, "LDLLW");
        let p = model.predict(home, away);
        assert!(p.home > p.away);
        assert!(p.home_xg > p.away_xg);
        assert!((p.home + p.draw + p.away - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bad_stats_fall_back_to_neutral() {
        let model = StrengthModel::default();
        let broken = TeamStrength::new(f64::NAN, 0.0, -3.0);
        let p = model.predict(broken, TeamStrength::default());
        let neutral = model.predict(TeamStrength::default(), TeamStrength::default());
        assert_eq!(p, neutral);
    }

    #[test]
    fn test_overrides_use_match_winner_labels() {
        let p = StrengthModel::default().predict(TeamStrength::default(), TeamStrength::default());
        let overrides = p.as_overrides();
        assert_eq!(overrides.len(), 3);
        assert_eq!(overrides[HOME_LABEL], p.home);
        assert_eq!(overrides[DRAW_LABEL], p.draw);
    }

    #[test]
    fn test_goals_shares_follow_total_xg() {
        let model = StrengthModel::default();
        // Neutral sides: 1.0 xG each.
        let p = model.predict(TeamStrength::default(), TeamStrength::default());
        assert!((p.over_2_5 - 2.0 / 3.0).abs() < 1e-12);
        assert!((p.both_score - 0.95).abs() < 1e-12);

        let home = TeamStrength::from_form_string(0.2, 3.0, "LLLLL");
        let away = TeamStrength::from_form_string(0.2, 3.0, "LLLLL");
        let p = model.predict(home, away);
        assert_eq!(p.over_2_5, MIN_SHARE);
        assert!((p.both_score - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_overrides_per_market() {
        let p = StrengthModel::default().predict(TeamStrength::default(), TeamStrength::default());

        let goals = p.overrides_for(GOALS_LINE_MARKET).unwrap();
        assert_eq!(goals[OVER_LABEL], p.over_2_5);
        assert!((goals[OVER_LABEL] + goals[UNDER_LABEL] - 1.0).abs() < 1e-12);

        let both = p.overrides_for(BOTH_SCORE_MARKET).unwrap();
        assert_eq!(both[YES_LABEL], p.both_score);
        assert!((both[YES_LABEL] + both[NO_LABEL] - 1.0).abs() < 1e-12);

        assert_eq!(p.overrides_for(MATCH_WINNER_MARKET).unwrap().len(), 3);
        assert!(p.overrides_for("Total de Gols 3.5").is_none());
        assert!(is_model_market(BOTH_SCORE_MARKET));
        assert!(!is_model_market("Placar Exato"));
    }
}
