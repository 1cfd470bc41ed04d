//! Throttle acquire-then-drive sequence
//!
//! JMRI only accepts speed and direction for a throttle name that has been
//! bound to a locomotive address on the same session. One run is two
//! round trips: bind, then set speed and direction. The sequence is not
//! transactional; if the second step fails the throttle stays bound.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::envelope::{self, Payload, Reply};
use crate::error::Result;
use crate::session::Session;
use crate::types::{ObjectType, ThrottlePhase, ThrottleState, Verb};

/// Outcome of a completed throttle run
#[derive(Debug, Clone, Serialize)]
pub struct TrainRun {
    /// Final throttle state, always in [`ThrottlePhase::SpeedDirectionSet`]
    pub throttle: ThrottleState,
    /// Reply to the bind request (may be empty)
    pub acquire_reply: Reply,
    /// Reply to the speed/direction request
    pub control_reply: Reply,
}

/// Drives one throttle through a session the caller has exclusive use of
pub struct ThrottleController<'a> {
    session: &'a mut Session,
}

impl<'a> ThrottleController<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Bind the throttle, then set its speed and direction
    ///
    /// Any reply to the bind request counts as success, including an empty
    /// one. A failure at either step returns immediately; nothing is retried
    /// and no release is sent.
    #[instrument(
        skip(self, state),
        fields(throttle = %state.throttle_name, address = state.engine_address)
    )]
    pub async fn run(&mut self, mut state: ThrottleState) -> Result<TrainRun> {
        let acquire = Payload::ThrottleAcquire {
            name: state.throttle_name.clone(),
            address: state.engine_address,
        };
        let message = envelope::encode(ObjectType::Throttle, Some(&acquire), None)?;

        state.phase = ThrottlePhase::Acquiring;
        let acquire_reply = self.session.send_and_receive(&message).await?;
        state.phase = ThrottlePhase::Bound;
        debug!("Throttle bound: {:?}", acquire_reply);

        let control = Payload::ThrottleControl {
            throttle: state.throttle_name.clone(),
            speed: state.speed,
            forward: state.direction.is_forward(),
        };
        let message = envelope::encode(ObjectType::Throttle, Some(&control), Some(Verb::Post))?;

        let control_reply = self.session.send_and_receive(&message).await?;
        state.phase = ThrottlePhase::SpeedDirectionSet;
        debug!("Speed {} {:?} set: {:?}", state.speed, state.direction, control_reply);

        Ok(TrainRun {
            throttle: state,
            acquire_reply,
            control_reply,
        })
    }
}
