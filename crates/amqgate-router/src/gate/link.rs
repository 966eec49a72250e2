//! AMQP Attach admission.
//!
//! Note on counters: a sender refused for its target address, or for being
//! an anonymous relay, is tallied as `receiverDenied`. Consumers of the
//! management statistics rely on that mapping.

use amqgate_core::protocol::{Denial, LinkEndpoint};

use crate::context::ConnectionRecord;
use crate::obs::DenialKind;
use crate::policy::Settings;

pub fn approve_sender<L>(link: &mut L, record: &ConnectionRecord) -> bool
where
    L: LinkEndpoint + ?Sized,
{
    let Some(settings) = record.settings() else {
        return true;
    };
    if settings.max_senders > 0 && record.n_senders() >= settings.max_senders {
        deny_link(link, record, settings, DenialKind::Sender, "sender");
        return false;
    }

    let user = record.user_id();
    let allowed = match link.remote_target().and_then(|t| t.proposed_address()) {
        Some(target) => {
            let ok = settings.targets.is_allowed(user, target);
            tracing::trace!(%target, %user, allow = ok, "approve sender link");
            ok
        }
        None => {
            let ok = settings.allow_anonymous_sender;
            tracing::trace!(%user, allow = ok, "approve anonymous relay sender link");
            ok
        }
    };
    if !allowed {
        deny_link(link, record, settings, DenialKind::Receiver, "receiver");
    }
    allowed
}

pub fn approve_receiver<L>(link: &mut L, record: &ConnectionRecord) -> bool
where
    L: LinkEndpoint + ?Sized,
{
    let Some(settings) = record.settings() else {
        return true;
    };
    if settings.max_receivers > 0 && record.n_receivers() >= settings.max_receivers {
        deny_link(link, record, settings, DenialKind::Receiver, "receiver");
        return false;
    }

    let user = record.user_id();
    let allowed = match link.remote_source() {
        Some(source) if source.dynamic => {
            let ok = settings.allow_dynamic_src;
            tracing::trace!(%user, allow = ok, "approve dynamic source");
            ok
        }
        Some(source) => match source.proposed_address() {
            Some(addr) => {
                let ok = settings.sources.is_allowed(user, addr);
                tracing::trace!(source = %addr, %user, allow = ok, "approve receiver link");
                ok
            }
            None => {
                tracing::trace!(%user, "receiver link without source address");
                false
            }
        },
        None => {
            tracing::trace!(%user, "receiver link without source");
            false
        }
    };
    if !allowed {
        deny_link(link, record, settings, DenialKind::Receiver, "receiver");
    }
    allowed
}

fn deny_link<L>(
    link: &mut L,
    record: &ConnectionRecord,
    settings: &Settings,
    kind: DenialKind,
    limit: &str,
) where
    L: LinkEndpoint + ?Sized,
{
    link.deny(Denial::Link.condition());
    settings.count_denial(kind);
    tracing::debug!(
        user = %record.user_id(),
        host_ip = %record.host_ip(),
        app = %record.remote_app(),
        "Attach denied due to {limit} limit"
    );
}
