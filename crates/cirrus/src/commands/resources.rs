//! List handlers for volumes, domains, load balancers and images.

use tabled::Tabled;

use cirrus_core::{Controller, Domain, Image, LoadBalancer, Volume, merge_events};

use crate::cli::{
    DomainsArgs, GlobalOpts, ImagesArgs, ListOnlyCommand, LoadBalancersArgs, VolumesArgs,
};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct VolumeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Attached To")]
    attached_to: String,
}

impl VolumeRow {
    fn new(v: &Volume, color: bool) -> Self {
        Self {
            id: v.id.to_string(),
            label: v.label.clone(),
            status: v.recent_event.as_ref().map_or_else(
                || output::paint_status(&v.status.to_string(), color),
                cirrus_core::Event::progress_label,
            ),
            size: format!("{} GB", v.size_gb),
            region: v.region.clone(),
            attached_to: v
                .server_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct DomainRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Type")]
    zone_kind: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl DomainRow {
    fn new(d: &Domain, color: bool) -> Self {
        Self {
            id: d.id.to_string(),
            domain: d.domain.clone(),
            zone_kind: d.zone_kind.to_string(),
            status: output::paint_status(&d.status.to_string(), color),
        }
    }
}

#[derive(Tabled)]
struct LoadBalancerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "IPv4")]
    ipv4: String,
    #[tabled(rename = "Region")]
    region: String,
}

impl From<&LoadBalancer> for LoadBalancerRow {
    fn from(lb: &LoadBalancer) -> Self {
        Self {
            id: lb.id.to_string(),
            label: lb.label.clone(),
            hostname: lb.hostname.clone().unwrap_or_default(),
            ipv4: lb.ipv4.clone().unwrap_or_default(),
            region: lb.region.clone(),
        }
    }
}

#[derive(Tabled)]
struct ImageRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Size")]
    size: String,
}

impl From<&Image> for ImageRow {
    fn from(i: &Image) -> Self {
        Self {
            id: i.id.to_string(),
            label: i.label.clone(),
            vendor: i.vendor.clone().unwrap_or_default(),
            size: format!("{} MB", i.size_mb),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub fn volumes(
    controller: &Controller,
    args: VolumesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ListOnlyCommand::List(list) = args.command;
    let color = output::should_color(global.color);
    let all = controller.volumes_snapshot();
    let events = controller.events_snapshot();
    let merged = merge_events(all.as_slice(), events.as_slice());
    let snap = util::apply_list_args(&merged, &list);
    let out = output::render_list(
        global.output,
        &snap,
        |v| VolumeRow::new(v, color),
        |v| v.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn domains(
    controller: &Controller,
    args: DomainsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ListOnlyCommand::List(list) = args.command;
    let color = output::should_color(global.color);
    let all = controller.domains_snapshot();
    let snap = util::apply_list_args(all.as_slice(), &list);
    let out = output::render_list(
        global.output,
        &snap,
        |d| DomainRow::new(d, color),
        |d| d.domain.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn load_balancers(
    controller: &Controller,
    args: LoadBalancersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ListOnlyCommand::List(list) = args.command;
    let all = controller.load_balancers_snapshot();
    let snap = util::apply_list_args(all.as_slice(), &list);
    let out = output::render_list(
        global.output,
        &snap,
        |lb| LoadBalancerRow::from(&**lb),
        |lb| lb.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Public images only; private images belong to other tooling.
pub fn images(
    controller: &Controller,
    args: ImagesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ListOnlyCommand::List(list) = args.command;
    let public: Vec<_> = controller
        .images_snapshot()
        .iter()
        .filter(|i| i.is_public)
        .cloned()
        .collect();
    let snap = util::apply_list_args(&public, &list);
    let out = output::render_list(
        global.output,
        &snap,
        |i| ImageRow::from(&**i),
        |i| i.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use cirrus_core::{DomainStatus, EntityId, ZoneKind};

    use super::*;

    #[test]
    fn domain_row_uses_wire_names() {
        let domain = Domain {
            id: EntityId::Numeric(20),
            domain: "example.com".into(),
            zone_kind: ZoneKind::Master,
            status: DomainStatus::Active,
            soa_email: None,
            tags: Vec::new(),
        };
        let row = DomainRow::new(&domain, false);
        assert_eq!(row.zone_kind, "master");
        assert_eq!(row.status, "active");
    }
}
