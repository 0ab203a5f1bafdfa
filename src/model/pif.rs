use crate::framework::Ref;
use crate::model::{Host, IpConfigurationMode, Ipv6ConfigurationMode, Network, PrimaryAddressType};
use std::collections::HashMap;

xenapi_class! {
    /// A physical network interface (or a VLAN or bond on top of one).
    pub class Pif = "PIF";

    pub record PifRecord {
        ro uuid: String = "uuid";
        ro device: String = "device";
        ro network: Ref<Network> = "network";
        ro host: Ref<Host> = "host";
        ro mac: String = "MAC";
        ro mtu: i64 = "MTU";
        ro vlan: i64 = "VLAN";
        ro physical: bool = "physical";
        ro currently_attached: bool = "currently_attached";
        ro ip_configuration_mode: IpConfigurationMode = "ip_configuration_mode";
        ro ip: String = "IP";
        ro netmask: String = "netmask";
        ro gateway: String = "gateway";
        ro dns: String = "DNS";
        ro management: bool = "management";
        map other_config: HashMap<String, String> = "other_config";
        rw disallow_unplug: bool = "disallow_unplug";
        ro ipv6_configuration_mode: Ipv6ConfigurationMode = "ipv6_configuration_mode";
        ro ipv6: Vec<String> = "IPv6";
        ro ipv6_gateway: String = "ipv6_gateway";
        ro primary_address_type: PrimaryAddressType = "primary_address_type";
        ro managed: bool = "managed";
        ro properties: HashMap<String, String> = "properties";
        ro capabilities: Vec<String> = "capabilities";
    }
}

xenapi_methods! {
    impl Pif = "PIF" {
        fn get_all() -> Vec<Ref<Pif>>;
        fn get_all_records() -> HashMap<Ref<Pif>, PifRecord>;

        task fn reconfigure_ip(
            this: &Ref<Pif>,
            mode: IpConfigurationMode,
            ip: &str,
            netmask: &str,
            gateway: &str,
            dns: &str,
        ) -> (), raises [PifConfigurationError];
        task fn reconfigure_ipv6(
            this: &Ref<Pif>,
            mode: Ipv6ConfigurationMode,
            ipv6: &str,
            gateway: &str,
            dns: &str,
        ) -> (), raises [PifConfigurationError];
        task fn plug(this: &Ref<Pif>) -> ();
        task fn unplug(this: &Ref<Pif>) -> (), raises [PifDoesNotAllowUnplug];
        /// Scans the host for interfaces the database does not know about.
        task fn scan(host: &Ref<Host>) -> ();
        /// Records an existing interface in the database.
        task fn introduce(host: &Ref<Host>, mac: &str, device: &str, managed: bool) -> Ref<Pif>,
            raises [MacInvalid];
        /// Removes the interface from the database only.
        task fn forget(this: &Ref<Pif>) -> (), raises [OperationNotAllowed];
        task fn destroy(this: &Ref<Pif>) -> (), raises [PifIsPhysical];
    }
}
