use super::rules::{code_rule, lacks_prefix, missing_diagnostics, missing_tags, NAMING_URL, TAGS_URL};
use crate::audit::domain::{
    AuxiliaryIndexes, Category, Impact, Recommendation, RecommendationType, ResourceInstance,
    RuleOutcome,
};
use crate::ports::outbound::ServiceScanner;

const VIRTUAL_MACHINE: &str = "microsoft.compute/virtualmachines";

/// Virtual machines (`vm`)
pub struct VirtualMachineScanner;

fn sla(r: &ResourceInstance, _: &AuxiliaryIndexes) -> RuleOutcome {
    let in_scale_set = r.property_str("virtualMachineScaleSet.id").is_some();
    let zoned = r.zones.len() > 1;
    let sla = if zoned {
        "99.99%"
    } else if in_scale_set {
        "99.95%"
    } else {
        "99.9%"
    };
    RuleOutcome::new(false, sla)
}

fn naming(r: &ResourceInstance, _: &AuxiliaryIndexes) -> RuleOutcome {
    lacks_prefix(r, "vm")
}

/// Public IPs attached to the VM that are not zone redundant, by id
fn non_zonal_public_ips(r: &ResourceInstance, idx: &AuxiliaryIndexes) -> RuleOutcome {
    let Some(interfaces) = r
        .property("networkProfile.networkInterfaces")
        .and_then(|v| v.as_array())
    else {
        return RuleOutcome::passed();
    };

    let offenders: Vec<String> = interfaces
        .iter()
        .filter_map(|nic| nic.pointer("/properties/ipConfigurations"))
        .filter_map(|v| v.as_array())
        .flatten()
        .filter_map(|cfg| cfg.pointer("/properties/publicIPAddress/id"))
        .filter_map(|v| v.as_str())
        .filter(|ip| idx.public_ip_zones(ip).is_some_and(|zones| zones.len() < 2))
        .map(String::from)
        .collect();

    RuleOutcome::new(!offenders.is_empty(), offenders.join(","))
}

impl ServiceScanner for VirtualMachineScanner {
    fn abbreviation(&self) -> &'static str {
        "vm"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &[VIRTUAL_MACHINE]
    }

    fn recommendations(&self) -> Vec<Recommendation> {
        vec![
            code_rule(
                "vm-001",
                VIRTUAL_MACHINE,
                Category::MonitoringAndAlerting,
                Impact::Low,
                "Virtual Machine should have diagnostic settings enabled",
                "https://learn.microsoft.com/azure/azure-monitor/essentials/diagnostic-settings",
                missing_diagnostics,
            ),
            code_rule(
                "vm-003",
                VIRTUAL_MACHINE,
                Category::HighAvailability,
                Impact::High,
                "Virtual Machine should have a SLA",
                "https://www.microsoft.com/licensing/docs/view/Service-Level-Agreements-SLA-for-Online-Services",
                sla,
            )
            .with_type(RecommendationType::Sla),
            code_rule(
                "vm-004",
                VIRTUAL_MACHINE,
                Category::HighAvailability,
                Impact::Medium,
                "Virtual Machine public IPs should be zone redundant",
                "https://learn.microsoft.com/azure/virtual-network/ip-services/public-ip-addresses#availability-zone",
                non_zonal_public_ips,
            ),
            code_rule(
                "vm-006",
                VIRTUAL_MACHINE,
                Category::Governance,
                Impact::Low,
                "Virtual Machine Name should comply with naming conventions",
                NAMING_URL,
                naming,
            ),
            code_rule(
                "vm-007",
                VIRTUAL_MACHINE,
                Category::Governance,
                Impact::Low,
                "Virtual Machine should have tags",
                TAGS_URL,
                missing_tags,
            ),
        ]
    }
}
