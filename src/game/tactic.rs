//! Tactic plans: the ordered Pass/Dribble/Shoot steps the planner submits
//! before a match attempt.
//!
//! Planner input arrives as loosely-typed [`TacticDraft`] records (usually
//! JSON). [`validate`] is the single gate that turns drafts into a
//! [`TacticPlan`] of closed [`TacticStep`] variants; the engine only ever
//! sees validated plans.

use serde::{Deserialize, Serialize};

use crate::game::position::Slot;

/// Dribble heading relative to the attacked goal (y = 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DribbleDirection {
    #[serde(alias = "toward_enemy")]
    TowardGoal,
    #[serde(alias = "away_enemy")]
    AwayFromGoal,
    Left,
    Right,
}

impl DribbleDirection {
    pub fn reversed(self) -> Self {
        match self {
            DribbleDirection::TowardGoal => DribbleDirection::AwayFromGoal,
            DribbleDirection::AwayFromGoal => DribbleDirection::TowardGoal,
            DribbleDirection::Left => DribbleDirection::Right,
            DribbleDirection::Right => DribbleDirection::Left,
        }
    }

    /// Unit step on the court for this heading
    pub fn delta(self) -> (f32, f32) {
        match self {
            DribbleDirection::TowardGoal => (0.0, -1.0),
            DribbleDirection::AwayFromGoal => (0.0, 1.0),
            DribbleDirection::Left => (-1.0, 0.0),
            DribbleDirection::Right => (1.0, 0.0),
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "toward_goal" | "toward_enemy" => Some(DribbleDirection::TowardGoal),
            "away_from_goal" | "away_enemy" => Some(DribbleDirection::AwayFromGoal),
            "left" => Some(DribbleDirection::Left),
            "right" => Some(DribbleDirection::Right),
            _ => None,
        }
    }
}

/// Named dribble distance tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DribbleDistance {
    Short,
    Medium,
    Long,
}

impl DribbleDistance {
    pub const ALL: [DribbleDistance; 3] =
        [DribbleDistance::Short, DribbleDistance::Medium, DribbleDistance::Long];

    /// Court units covered
    pub fn units(self) -> f32 {
        match self {
            DribbleDistance::Short => 10.0,
            DribbleDistance::Medium => 30.0,
            DribbleDistance::Long => 50.0,
        }
    }

    /// Seconds before the follow-up action fires
    pub fn duration(self) -> f32 {
        match self {
            DribbleDistance::Short => 0.5,
            DribbleDistance::Medium => 1.5,
            DribbleDistance::Long => 2.5,
        }
    }

    fn from_units(units: f32) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| (tier.units() - units).abs() < f32::EPSILON)
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "short" => Some(DribbleDistance::Short),
            "medium" => Some(DribbleDistance::Medium),
            "long" => Some(DribbleDistance::Long),
            _ => None,
        }
    }
}

/// What happens once a dribble's duration elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    DribbleBack,
    Pass,
    ShootCorner,
    ShootCenter,
}

impl NextAction {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "dribble_back" => Some(NextAction::DribbleBack),
            "pass" => Some(NextAction::Pass),
            "shoot_corner" => Some(NextAction::ShootCorner),
            "shoot_center" => Some(NextAction::ShootCenter),
            _ => None,
        }
    }
}

/// Shot placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShootType {
    /// Careful shot at the corner away from the goalkeeper
    Corner,
    /// All-out shot straight down the middle
    Center,
}

impl ShootType {
    /// Multiplier on the shoot stat for the field-player block check
    pub fn power(self) -> f32 {
        match self {
            ShootType::Corner => 1.0,
            ShootType::Center => 2.5,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "corner" => Some(ShootType::Corner),
            "center" => Some(ShootType::Center),
            _ => None,
        }
    }
}

/// One validated plan step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TacticStep {
    Pass {
        to: Slot,
    },
    Dribble {
        direction: DribbleDirection,
        distance: DribbleDistance,
        next_action: NextAction,
        /// Present iff `next_action` is `Pass` in validated plans
        pass_to: Option<Slot>,
    },
    Shoot {
        shoot_type: ShootType,
    },
}

impl TacticStep {
    pub fn kind(&self) -> &'static str {
        match self {
            TacticStep::Pass { .. } => "pass",
            TacticStep::Dribble { .. } => "dribble",
            TacticStep::Shoot { .. } => "shoot",
        }
    }
}

/// Dribble distance as the planner sends it: a tier name or its unit count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DistanceSpec {
    Units(f32),
    Named(String),
}

/// Raw planner record. Every field is optional; [`validate`] decides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacticDraft {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub direction: Option<String>,
    pub distance: Option<DistanceSpec>,
    pub next_action: Option<String>,
    pub pass_to: Option<String>,
    pub shoot_type: Option<String>,
}

impl TacticDraft {
    pub fn pass(to: &str) -> Self {
        Self {
            kind: Some("pass".into()),
            to: Some(to.into()),
            ..Default::default()
        }
    }

    pub fn shoot(shoot_type: &str) -> Self {
        Self {
            kind: Some("shoot".into()),
            shoot_type: Some(shoot_type.into()),
            ..Default::default()
        }
    }
}

/// Plan rejected by the planner-side precondition check
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("plan has no steps")]
    Empty,
    #[error("step {step}: missing type")]
    MissingType { step: usize },
    #[error("step {step}: unknown type '{kind}'")]
    UnknownType { step: usize, kind: String },
    #[error("step {step}: {kind} is missing '{field}'")]
    MissingField {
        step: usize,
        kind: &'static str,
        field: &'static str,
    },
    #[error("step {step}: invalid {field} '{value}'")]
    InvalidValue {
        step: usize,
        field: &'static str,
        value: String,
    },
    #[error("step {step}: {holder} cannot pass to itself")]
    SelfPass { step: usize, holder: Slot },
}

/// Validated, non-empty sequence of steps. Deserialization runs the same
/// checks as [`TacticPlan::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TacticStep>", into = "Vec<TacticStep>")]
pub struct TacticPlan {
    steps: Vec<TacticStep>,
}

impl TryFrom<Vec<TacticStep>> for TacticPlan {
    type Error = PlanError;

    fn try_from(steps: Vec<TacticStep>) -> Result<Self, Self::Error> {
        Self::new(steps)
    }
}

impl From<TacticPlan> for Vec<TacticStep> {
    fn from(plan: TacticPlan) -> Self {
        plan.steps
    }
}

impl TacticPlan {
    /// Build from already-typed steps, checking the same invariants as [`validate`]
    pub fn new(steps: Vec<TacticStep>) -> Result<Self, PlanError> {
        if steps.is_empty() {
            return Err(PlanError::Empty);
        }

        let mut holder = Slot::CenterBack;
        for (i, step) in steps.iter().enumerate() {
            let receiver = match step {
                TacticStep::Pass { to } => Some(*to),
                TacticStep::Dribble { next_action: NextAction::Pass, pass_to: None, .. } => {
                    return Err(PlanError::MissingField {
                        step: i + 1,
                        kind: "dribble",
                        field: "passTo",
                    });
                }
                TacticStep::Dribble { next_action: NextAction::Pass, pass_to, .. } => *pass_to,
                _ => None,
            };
            if let Some(to) = receiver {
                if to == holder {
                    return Err(PlanError::SelfPass { step: i + 1, holder });
                }
                holder = to;
            }
        }
        Ok(Self { steps })
    }

    /// Bypasses validation so engine tests can feed it malformed steps
    #[cfg(test)]
    pub(crate) fn unchecked(steps: Vec<TacticStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[TacticStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TacticStep> {
        self.steps.get(index)
    }

    /// Replace step `index` and drop every later step, since they were
    /// planned against the old holder chain. Returns how many were dropped.
    pub fn replace_step(&mut self, index: usize, step: TacticStep) -> Result<usize, PlanError> {
        if index >= self.steps.len() {
            return Err(out_of_range(index));
        }
        let mut steps = self.steps[..index].to_vec();
        steps.push(step);
        let dropped = self.steps.len() - index - 1;
        *self = Self::new(steps)?;
        Ok(dropped)
    }

    /// Delete step `index`. The remaining plan must still be valid.
    pub fn remove_step(&mut self, index: usize) -> Result<TacticStep, PlanError> {
        if index >= self.steps.len() {
            return Err(out_of_range(index));
        }
        let mut steps = self.steps.clone();
        let removed = steps.remove(index);
        *self = Self::new(steps)?;
        Ok(removed)
    }

    /// Holder after replaying the plan: starts at CB, every pass (direct or
    /// chained from a dribble) hands the ball to its target. The first entry
    /// is the initial holder.
    pub fn ball_holder_history(&self) -> Vec<Slot> {
        let mut history = vec![Slot::CenterBack];
        for step in &self.steps {
            match step {
                TacticStep::Pass { to } => history.push(*to),
                TacticStep::Dribble { next_action: NextAction::Pass, pass_to: Some(to), .. } => {
                    history.push(*to)
                }
                _ => {}
            }
        }
        history
    }
}

/// Check planner drafts and build a plan.
///
/// Rules: the plan is non-empty; every step declares a type; `pass` needs
/// `to`; `dribble` needs `direction`, `distance` and `nextAction`, plus
/// `passTo` iff `nextAction` is `pass`; `shoot` needs `shootType`. No pass
/// may target the player holding the ball at that point of the plan.
pub fn validate(drafts: &[TacticDraft]) -> Result<TacticPlan, PlanError> {
    if drafts.is_empty() {
        return Err(PlanError::Empty);
    }

    let steps = drafts
        .iter()
        .enumerate()
        .map(|(i, draft)| validate_step(i + 1, draft))
        .collect::<Result<Vec<_>, _>>()?;

    TacticPlan::new(steps)
}

fn validate_step(step: usize, draft: &TacticDraft) -> Result<TacticStep, PlanError> {
    let kind = draft
        .kind
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or(PlanError::MissingType { step })?;

    match kind {
        "pass" => {
            let to = required(step, "pass", "to", &draft.to)?;
            Ok(TacticStep::Pass {
                to: parse_slot(step, "to", to)?,
            })
        }
        "dribble" => {
            let direction = required(step, "dribble", "direction", &draft.direction)?;
            let distance = draft.distance.as_ref().ok_or(PlanError::MissingField {
                step,
                kind: "dribble",
                field: "distance",
            })?;
            let next_action = required(step, "dribble", "nextAction", &draft.next_action)?;

            let direction = DribbleDirection::parse(direction).ok_or_else(|| invalid(step, "direction", direction))?;
            let distance = parse_distance(step, distance)?;
            let next_action =
                NextAction::parse(next_action).ok_or_else(|| invalid(step, "nextAction", next_action))?;

            let pass_to = match next_action {
                NextAction::Pass => {
                    let to = required(step, "dribble", "passTo", &draft.pass_to)?;
                    Some(parse_slot(step, "passTo", to)?)
                }
                _ => None,
            };

            Ok(TacticStep::Dribble {
                direction,
                distance,
                next_action,
                pass_to,
            })
        }
        "shoot" => {
            let shoot_type = required(step, "shoot", "shootType", &draft.shoot_type)?;
            Ok(TacticStep::Shoot {
                shoot_type: ShootType::parse(shoot_type).ok_or_else(|| invalid(step, "shootType", shoot_type))?,
            })
        }
        other => Err(PlanError::UnknownType {
            step,
            kind: other.to_string(),
        }),
    }
}

fn required<'a>(
    step: usize,
    kind: &'static str,
    field: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str, PlanError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(PlanError::MissingField { step, kind, field })
}

fn out_of_range(index: usize) -> PlanError {
    PlanError::InvalidValue {
        step: index + 1,
        field: "index",
        value: index.to_string(),
    }
}

fn invalid(step: usize, field: &'static str, value: &str) -> PlanError {
    PlanError::InvalidValue {
        step,
        field,
        value: value.to_string(),
    }
}

fn parse_slot(step: usize, field: &'static str, value: &str) -> Result<Slot, PlanError> {
    value.parse().map_err(|_| invalid(step, field, value))
}

fn parse_distance(step: usize, value: &DistanceSpec) -> Result<DribbleDistance, PlanError> {
    match value {
        DistanceSpec::Units(units) => {
            DribbleDistance::from_units(*units).ok_or_else(|| invalid(step, "distance", &units.to_string()))
        }
        DistanceSpec::Named(name) => DribbleDistance::from_name(name).ok_or_else(|| invalid(step, "distance", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drafts(json: &str) -> Vec<TacticDraft> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_accepts_pass_then_shoot() {
        let plan = validate(&drafts(
            r#"[{"type":"pass","from":"CB","to":"LW"},{"type":"shoot","shootType":"center"}]"#,
        ))
        .unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.steps()[0], TacticStep::Pass { to: Slot::LeftWing });
        assert_eq!(plan.steps()[1], TacticStep::Shoot { shoot_type: ShootType::Center });
    }

    #[test]
    fn test_rejects_dribble_pass_without_target() {
        let err = validate(&drafts(
            r#"[{"type":"dribble","direction":"left","distance":10,"nextAction":"pass"}]"#,
        ))
        .unwrap_err();
        assert_eq!(
            err,
            PlanError::MissingField { step: 1, kind: "dribble", field: "passTo" }
        );
        assert!(err.to_string().contains("passTo"));
    }

    #[test]
    fn test_rejects_empty_plan() {
        assert_eq!(validate(&[]).unwrap_err(), PlanError::Empty);
    }

    #[test]
    fn test_rejects_missing_type() {
        let err = validate(&drafts(r#"[{"to":"LW"}]"#)).unwrap_err();
        assert_eq!(err, PlanError::MissingType { step: 1 });
    }

    #[test]
    fn test_rejects_pass_without_target() {
        let err = validate(&drafts(r#"[{"type":"pass","from":"CB"}]"#)).unwrap_err();
        assert!(matches!(err, PlanError::MissingField { field: "to", .. }));
    }

    #[test]
    fn test_rejects_shoot_without_type() {
        let err = validate(&drafts(r#"[{"type":"pass","to":"RW"},{"type":"shoot"}]"#)).unwrap_err();
        assert_eq!(
            err,
            PlanError::MissingField { step: 2, kind: "shoot", field: "shootType" }
        );
    }

    #[test]
    fn test_rejects_unknown_slot() {
        let err = validate(&drafts(r#"[{"type":"pass","to":"QB"}]"#)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidValue { field: "to", .. }));
    }

    #[test]
    fn test_distance_by_name_or_units() {
        let plan = validate(&drafts(
            r#"[{"type":"dribble","direction":"toward_enemy","distance":"long","nextAction":"shoot_corner"},
                {"type":"dribble","direction":"right","distance":30,"nextAction":"pass","passTo":"RW"}]"#,
        ))
        .unwrap();
        assert!(matches!(
            plan.steps()[0],
            TacticStep::Dribble { direction: DribbleDirection::TowardGoal, distance: DribbleDistance::Long, .. }
        ));
        assert!(matches!(
            plan.steps()[1],
            TacticStep::Dribble { distance: DribbleDistance::Medium, pass_to: Some(Slot::RightWing), .. }
        ));
    }

    #[test]
    fn test_rejects_off_tier_distance() {
        let err = validate(&drafts(
            r#"[{"type":"dribble","direction":"left","distance":12,"nextAction":"dribble_back"}]"#,
        ))
        .unwrap_err();
        assert!(matches!(err, PlanError::InvalidValue { field: "distance", .. }));
    }

    #[test]
    fn test_ball_holder_history() {
        let plan = TacticPlan::new(vec![
            TacticStep::Pass { to: Slot::RightWing },
            TacticStep::Dribble {
                direction: DribbleDirection::Left,
                distance: DribbleDistance::Short,
                next_action: NextAction::Pass,
                pass_to: Some(Slot::Pivot),
            },
            TacticStep::Shoot { shoot_type: ShootType::Corner },
        ])
        .unwrap();
        assert_eq!(
            plan.ball_holder_history(),
            vec![Slot::CenterBack, Slot::RightWing, Slot::Pivot]
        );
    }

    #[test]
    fn test_replace_step_keeps_invariant() {
        let mut plan = TacticPlan::new(vec![TacticStep::Shoot { shoot_type: ShootType::Center }]).unwrap();
        let bad = TacticStep::Dribble {
            direction: DribbleDirection::Left,
            distance: DribbleDistance::Short,
            next_action: NextAction::Pass,
            pass_to: None,
        };
        assert!(plan.replace_step(0, bad).is_err());
        assert!(plan.replace_step(3, TacticStep::Pass { to: Slot::Pivot }).is_err());
        assert_eq!(plan.replace_step(0, TacticStep::Pass { to: Slot::Pivot }), Ok(0));
        assert_eq!(plan.steps()[0], TacticStep::Pass { to: Slot::Pivot });
    }

    #[test]
    fn test_replace_step_drops_later_steps() {
        let mut plan = TacticPlan::new(vec![
            TacticStep::Pass { to: Slot::LeftBack },
            TacticStep::Pass { to: Slot::Pivot },
            TacticStep::Pass { to: Slot::RightWing },
            TacticStep::Shoot { shoot_type: ShootType::Corner },
        ])
        .unwrap();

        assert_eq!(plan.replace_step(1, TacticStep::Pass { to: Slot::LeftWing }), Ok(2));
        assert_eq!(
            plan.steps(),
            &[TacticStep::Pass { to: Slot::LeftBack }, TacticStep::Pass { to: Slot::LeftWing }]
        );
    }

    #[test]
    fn test_rejects_pass_to_current_holder() {
        let err = validate(&drafts(r#"[{"type":"pass","to":"CB"}]"#)).unwrap_err();
        assert_eq!(err, PlanError::SelfPass { step: 1, holder: Slot::CenterBack });

        let err = validate(&drafts(
            r#"[{"type":"pass","to":"RW"},
                {"type":"dribble","direction":"left","distance":"short","nextAction":"pass","passTo":"RW"}]"#,
        ))
        .unwrap_err();
        assert_eq!(err, PlanError::SelfPass { step: 2, holder: Slot::RightWing });
    }

    #[test]
    fn test_remove_step() {
        let mut plan = TacticPlan::new(vec![
            TacticStep::Pass { to: Slot::LeftBack },
            TacticStep::Pass { to: Slot::Pivot },
            TacticStep::Shoot { shoot_type: ShootType::Center },
        ])
        .unwrap();

        assert_eq!(plan.remove_step(1), Ok(TacticStep::Pass { to: Slot::Pivot }));
        assert_eq!(plan.len(), 2);
        assert!(plan.remove_step(5).is_err());

        // Removing LB would leave CB passing to itself
        let mut chain = TacticPlan::new(vec![
            TacticStep::Pass { to: Slot::LeftBack },
            TacticStep::Pass { to: Slot::CenterBack },
        ])
        .unwrap();
        assert_eq!(chain.remove_step(0), Err(PlanError::SelfPass { step: 1, holder: Slot::CenterBack }));
        assert_eq!(chain.len(), 2);

        let mut single = TacticPlan::new(vec![TacticStep::Shoot { shoot_type: ShootType::Corner }]).unwrap();
        assert_eq!(single.remove_step(0), Err(PlanError::Empty));
    }

    #[test]
    fn test_deserialize_runs_validation() {
        let plan: TacticPlan =
            serde_json::from_str(r#"[{"type":"pass","to":"RW"},{"type":"shoot","shoot_type":"corner"}]"#).unwrap();
        assert_eq!(plan.len(), 2);
        let encoded = serde_json::to_string(&plan).unwrap();
        assert_eq!(serde_json::from_str::<TacticPlan>(&encoded).unwrap(), plan);

        assert!(serde_json::from_str::<TacticPlan>("[]").is_err());
        assert!(serde_json::from_str::<TacticPlan>(
            r#"[{"type":"dribble","direction":"left","distance":"short","next_action":"pass","pass_to":null}]"#
        )
        .is_err());
    }

    #[test]
    fn test_direction_reversal() {
        assert_eq!(DribbleDirection::Left.reversed(), DribbleDirection::Right);
        assert_eq!(DribbleDirection::TowardGoal.reversed(), DribbleDirection::AwayFromGoal);
    }
}
