use herring_runtime::thread_actor::{ActorContext, Handler};

use crate::device_info;
use crate::engine::actor::ControlActor;
use crate::engine::messages::ReadDeviceNameMessage;

impl Handler<ReadDeviceNameMessage> for ControlActor {
    fn handle(
        &mut self,
        message: ReadDeviceNameMessage,
        _ctx: &mut ActorContext<Self>,
    ) -> Vec<u8> {
        device_info::read_at(&self.device_name, message.offset, message.max)
    }
}
