//! Outbound Sender

use crate::error::Result;
use crate::host::HostPage;
use crate::message::OutboundMessage;
use crate::session::FrameId;

/// Post `message` into the frame, restricted to `target_origin`.
///
/// Returns `Ok(false)` without posting when the frame or its content window
/// is gone.
pub fn send<H: HostPage>(
    host: &H,
    frame_id: &FrameId,
    message: &OutboundMessage,
    target_origin: &str,
) -> Result<bool> {
    let Some(window) = host.frame_window(frame_id) else {
        tracing::debug!(frame_id = %frame_id, "Frame gone, outbound message dropped");
        return Ok(false);
    };

    host.post_message(&window, &message.to_value()?, target_origin)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FrameSpec, MemoryHost};
    use crate::message::InitiationPayload;

    fn message() -> OutboundMessage {
        OutboundMessage::InitiateTransaction(InitiationPayload::access_code("AC_1"))
    }

    #[test]
    fn test_send_targets_origin() {
        let host = MemoryHost::new();
        let id = FrameId::from_string("f");
        host.mount_frame(&FrameSpec::checkout(id.clone(), "https://checkout.cashonrails.com"))
            .unwrap();

        assert!(send(&host, &id, &message(), "https://checkout.cashonrails.com").unwrap());
        let posted = host.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].target_origin, "https://checkout.cashonrails.com");
        assert_eq!(Some(posted[0].window), host.window_of(&id));
    }

    #[test]
    fn test_send_without_frame_is_noop() {
        let host = MemoryHost::new();
        let id = FrameId::from_string("f");
        assert!(!send(&host, &id, &message(), "https://checkout.cashonrails.com").unwrap());

        host.mount_frame(&FrameSpec::checkout(id.clone(), "https://checkout.cashonrails.com"))
            .unwrap();
        host.detach_window(&id);
        assert!(!send(&host, &id, &message(), "https://checkout.cashonrails.com").unwrap());
        assert!(host.posted().is_empty());
    }
}
