//! Goal dispatch to the controller under test.

use tracing::info;

use crate::config::TrialConfig;
use crate::core::Point2D;
use crate::error::{BenchError, Result};
use crate::sim::{GoalPose, NavigationController};

/// Confirmation of a submitted goal.
#[derive(Clone, Debug, PartialEq)]
pub struct GoalDispatch {
    pub goal: GoalPose,
    pub confirmed: bool,
}

/// Goal as the controller sees it: the offset from the start pose, in the
/// configured (start-relative) frame.
pub fn trial_goal(config: &TrialConfig) -> GoalPose {
    GoalPose::new(
        config.goal_frame.clone(),
        Point2D::new(config.goal_offset.dx, config.goal_offset.dy),
    )
}

/// Wait for the controller to accept goals, then submit the trial goal once.
pub fn dispatch_goal<C: NavigationController + ?Sized>(
    controller: &mut C,
    config: &TrialConfig,
) -> Result<GoalDispatch> {
    let timeout = config.controller_ready_timeout();
    if !controller.wait_for_server(timeout)? {
        return Err(BenchError::ControllerUnavailable(format!(
            "goal interface not ready within {:?}",
            timeout
        )));
    }

    let goal = trial_goal(config);
    controller.send_goal(&goal)?;
    info!(
        "Goal ({:.2}, {:.2}) sent in frame '{}'",
        goal.position.x, goal.position.y, goal.frame_id
    );

    Ok(GoalDispatch {
        goal,
        confirmed: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Pose2D;
    use crate::sim::MockWorld;

    #[test]
    fn test_goal_sent_once() {
        let world = MockWorld::new(Pose2D::default());
        let mut ctrl = world.controller();

        let dispatch = dispatch_goal(&mut ctrl, &TrialConfig::default()).unwrap();
        assert!(dispatch.confirmed);
        assert_eq!(dispatch.goal.frame_id, "odom");
        assert_eq!(dispatch.goal.position, Point2D::new(0.0, 10.0));
        assert_eq!(dispatch.goal.orientation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(world.goals(), vec![dispatch.goal]);
    }

    #[test]
    fn test_controller_not_ready() {
        let world = MockWorld::new(Pose2D::default()).with_controller_ready(false);
        let mut ctrl = world.controller();

        let err = dispatch_goal(&mut ctrl, &TrialConfig::default()).unwrap_err();
        assert!(matches!(err, BenchError::ControllerUnavailable(_)));
        assert!(world.goals().is_empty());
    }
}
