/// Points for any correct answer.
pub const BASE_POINTS: i64 = 100;

/// Bonus points per second left on the countdown.
pub const TIME_BONUS_PER_SECOND: f64 = 2.0;

/// Points deducted per revealed hint.
pub const HINT_PENALTY: i64 = 20;

/// Seconds on the countdown when a question is shown.
pub const QUESTION_TIME_LIMIT_SECS: u32 = 30;

/// Score awarded for a correct answer.
///
/// The result is not clamped: enough hints can make it smaller than the base.
#[must_use]
pub fn correct_answer_points(time_remaining_secs: u32, hints_revealed: usize) -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    let time_bonus = (f64::from(time_remaining_secs) * TIME_BONUS_PER_SECOND).floor() as i64;
    let penalty = i64::try_from(hints_revealed)
        .unwrap_or(i64::MAX / HINT_PENALTY)
        .saturating_mul(HINT_PENALTY);
    BASE_POINTS + time_bonus - penalty
}
