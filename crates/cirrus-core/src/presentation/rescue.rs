use std::sync::Arc;

use serde::Serialize;

use crate::model::{Entity, EntityId, Server, Volume};

/// Volumes a server can boot into rescue mode with: same region, and
/// either attached to this server or to none.
pub fn eligible_rescue_volumes<V>(server: &Server, volumes: &[V]) -> Vec<V>
where
    V: AsRef<Volume> + Clone,
{
    volumes
        .iter()
        .filter(|v| {
            let v: &Volume = (*v).as_ref();
            v.region == server.region
                && v.server_id.as_ref().is_none_or(|owner| owner == server.id())
        })
        .cloned()
        .collect()
}

/// Device picker for a server's rescue view.
#[derive(Debug, Clone, Serialize)]
pub struct RescueDevices {
    pub server_id: EntityId,
    pub region: String,
    pub volumes: Vec<Arc<Volume>>,
}

impl RescueDevices {
    pub fn build(server: &Server, volumes: &[Arc<Volume>]) -> Self {
        Self {
            server_id: server.id.clone(),
            region: server.region.clone(),
            volumes: eligible_rescue_volumes(server, volumes),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.volumes.iter().map(|v| v.label.as_str()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fixtures::{server, volume};

    fn volumes() -> Vec<Arc<Volume>> {
        vec![
            Arc::new(volume(1, "mine", "us-east", Some(7))),
            Arc::new(volume(2, "free", "us-east", None)),
            Arc::new(volume(3, "someone-else", "us-east", Some(8))),
            Arc::new(volume(4, "far-away", "eu-west", None)),
            Arc::new(volume(5, "mine-but-far", "eu-west", Some(7))),
        ]
    }

    #[test]
    fn same_region_and_attached_here_or_nowhere() {
        let srv = server(7, "web");
        let devices = RescueDevices::build(&srv, &volumes());
        assert_eq!(devices.labels(), vec!["mine", "free"]);
        assert!(devices.volumes.iter().all(|v| v.region == srv.region));
    }

    #[test]
    fn nothing_eligible_is_empty() {
        let mut srv = server(9, "lonely");
        srv.region = "ap-south".into();
        assert!(RescueDevices::build(&srv, &volumes()).is_empty());
    }
}
