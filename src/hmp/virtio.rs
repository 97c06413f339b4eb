//! Para-virtual device introspection.

use super::{Hmp, check};
use crate::{
    args::Args,
    error::{Error, Result},
    machine::Machine,
    mapi::{
        Mapi,
        types::{
            VhostDeviceProtocols, VirtQueueStatus, VirtVhostQueueStatus, VirtioDeviceFeatures,
            VirtioDeviceStatus, VirtioQueueElement, VirtioStatus,
        },
    },
    monitor::Monitor,
};

impl<H: Mapi + Machine> Hmp<H> {
    /// `info virtio`: one `path [name]` line per device.
    pub fn info_virtio(&self, mon: &mut Monitor) {
        let Some(list) = check(mon, self.host.x_query_virtio()) else {
            return;
        };

        if list.is_empty() {
            mon.puts("No VirtIO devices\n");
            return;
        }

        for dev in &list {
            writeln!(mon, "{} [{}]", dev.path, dev.name);
        }
    }

    /// `virtio status path`.
    pub fn virtio_status(&self, mon: &mut Monitor, args: &Args) -> Result<()> {
        let path = args.get_str("path")?;
        if let Some(s) = check(mon, self.host.x_query_virtio_status(path)) {
            print_virtio_status(mon, path, &s);
        }
        Ok(())
    }

    /// `virtio queue-status path queue`.
    pub fn virtio_queue_status(&self, mon: &mut Monitor, args: &Args) -> Result<()> {
        let path = args.get_str("path")?;
        let queue = queue_arg(args, "queue")?;
        if let Some(s) = check(mon, self.host.x_query_virtio_queue_status(path, queue)) {
            print_queue_status(mon, path, &s);
        }
        Ok(())
    }

    /// `vhost queue-status path queue`.
    pub fn vhost_queue_status(&self, mon: &mut Monitor, args: &Args) -> Result<()> {
        let path = args.get_str("path")?;
        let queue = queue_arg(args, "queue")?;
        if let Some(s) = check(mon, self.host.x_query_virtio_vhost_queue_status(path, queue)) {
            print_vhost_queue_status(mon, path, &s);
        }
        Ok(())
    }

    /// `virtio queue-element path queue [index]`.
    ///
    /// Without `index` the element at the queue head is shown.
    pub fn virtio_queue_element(&self, mon: &mut Monitor, args: &Args) -> Result<()> {
        let path = args.get_str("path")?;
        let queue = queue_arg(args, "queue")?;
        let index = match args.try_int("index") {
            Some(i) => Some(to_u16(i)?),
            None => None,
        };

        let res = self.host.x_query_virtio_queue_element(path, queue, index);
        if let Some(e) = check(mon, res) {
            print_queue_element(mon, path, &e);
        }
        Ok(())
    }
}

fn queue_arg(args: &Args, name: &str) -> Result<u16> {
    to_u16(args.get_int(name)?)
}

fn to_u16(v: i64) -> Result<u16> {
    u16::try_from(v).map_err(|_| Error::InvalidParameterValue(v.to_string()))
}

fn yes(b: bool) -> &'static str {
    if b { "true" } else { "false" }
}

/// `\t<item>` per entry, `,\n` between entries, `\n` after the last.
fn dump_list(mon: &mut Monitor, items: &[String]) {
    let mut it = items.iter().peekable();
    while let Some(item) = it.next() {
        write!(mon, "\t{item}");
        if it.peek().is_some() {
            mon.puts(",\n");
        }
    }
    mon.puts("\n");
}

/// Print a device status bitset.
pub fn dump_status(mon: &mut Monitor, status: &VirtioDeviceStatus) {
    dump_list(mon, &status.statuses);
    if let Some(bits) = status.unknown_statuses {
        writeln!(mon, "  unknown-statuses({bits:#018x})");
    }
}

/// Print a feature bitset: transport features, then device features.
pub fn dump_features(mon: &mut Monitor, features: &VirtioDeviceFeatures) {
    dump_list(mon, &features.transports);
    if let Some(dev) = features.dev_features.as_deref().filter(|d| !d.is_empty()) {
        dump_list(mon, dev);
    }
    if let Some(bits) = features.unknown_dev_features {
        writeln!(mon, "  unknown-features({bits:#018x})");
    }
}

/// Print a vhost-user protocol feature bitset.
pub fn dump_protocols(mon: &mut Monitor, protocols: &VhostDeviceProtocols) {
    dump_list(mon, &protocols.protocols);
    if let Some(bits) = protocols.unknown_protocols {
        writeln!(mon, "  unknown-protocols({bits:#018x})");
    }
}

/// Render `x-query-virtio-status` for the device at `path`.
pub fn print_virtio_status(mon: &mut Monitor, path: &str, s: &VirtioStatus) {
    let tag = if s.vhost_dev.is_some() { "(vhost)" } else { "" };

    writeln!(mon, "{path}:");
    writeln!(mon, "  device_name:             {} {tag}", s.name);
    writeln!(mon, "  device_id:               {}", s.device_id);
    writeln!(mon, "  vhost_started:           {}", yes(s.vhost_started));
    writeln!(mon, "  bus_name:                {}", s.bus_name);
    writeln!(mon, "  broken:                  {}", yes(s.broken));
    writeln!(mon, "  disabled:                {}", yes(s.disabled));
    writeln!(mon, "  disable_legacy_check:    {}", yes(s.disable_legacy_check));
    writeln!(mon, "  started:                 {}", yes(s.started));
    writeln!(mon, "  use_started:             {}", yes(s.use_started));
    writeln!(mon, "  start_on_kick:           {}", yes(s.start_on_kick));
    writeln!(mon, "  use_guest_notifier_mask: {}", yes(s.use_guest_notifier_mask));
    writeln!(mon, "  vm_running:              {}", yes(s.vm_running));
    writeln!(mon, "  num_vqs:                 {}", s.num_vqs);
    writeln!(mon, "  queue_sel:               {}", s.queue_sel);
    writeln!(mon, "  isr:                     {}", s.isr);
    writeln!(mon, "  endianness:              {}", s.device_endian);
    mon.puts("  status:\n");
    dump_status(mon, &s.status);
    mon.puts("  Guest features:\n");
    dump_features(mon, &s.guest_features);
    mon.puts("  Host features:\n");
    dump_features(mon, &s.host_features);
    mon.puts("  Backend features:\n");
    dump_features(mon, &s.backend_features);

    let Some(v) = &s.vhost_dev else {
        return;
    };

    mon.puts("  VHost:\n");
    writeln!(mon, "    nvqs:           {}", v.nvqs);
    writeln!(mon, "    vq_index:       {}", v.vq_index);
    writeln!(mon, "    max_queues:     {}", v.max_queues);
    writeln!(mon, "    n_mem_sections: {}", v.n_mem_sections);
    writeln!(mon, "    n_tmp_sections: {}", v.n_tmp_sections);
    writeln!(mon, "    backend_cap:    {}", v.backend_cap);
    writeln!(mon, "    log_enabled:    {}", yes(v.log_enabled));
    writeln!(mon, "    log_size:       {}", v.log_size);
    mon.puts("    Features:\n");
    dump_features(mon, &v.features);
    mon.puts("    Acked features:\n");
    dump_features(mon, &v.acked_features);
    mon.puts("    Backend features:\n");
    dump_features(mon, &v.backend_features);
    mon.puts("    Protocol features:\n");
    dump_protocols(mon, &v.protocol_features);
}

/// Render `x-query-virtio-queue-status`.
pub fn print_queue_status(mon: &mut Monitor, path: &str, s: &VirtQueueStatus) {
    writeln!(mon, "{path}:");
    writeln!(mon, "  device_name:          {}", s.name);
    writeln!(mon, "  queue_index:          {}", s.queue_index);
    writeln!(mon, "  inuse:                {}", s.inuse);
    writeln!(mon, "  used_idx:             {}", s.used_idx);
    writeln!(mon, "  signalled_used:       {}", s.signalled_used);
    writeln!(mon, "  signalled_used_valid: {}", yes(s.signalled_used_valid));
    // vhost devices keep these indices in the back-end.
    if let Some(idx) = s.last_avail_idx {
        writeln!(mon, "  last_avail_idx:       {idx}");
    }
    if let Some(idx) = s.shadow_avail_idx {
        writeln!(mon, "  shadow_avail_idx:     {idx}");
    }
    mon.puts("  VRing:\n");
    writeln!(mon, "    num:          {}", s.vring_num);
    writeln!(mon, "    num_default:  {}", s.vring_num_default);
    writeln!(mon, "    align:        {}", s.vring_align);
    writeln!(mon, "    desc:         {:#018x}", s.vring_desc);
    writeln!(mon, "    avail:        {:#018x}", s.vring_avail);
    writeln!(mon, "    used:         {:#018x}", s.vring_used);
}

/// Render `x-query-virtio-vhost-queue-status`.
pub fn print_vhost_queue_status(mon: &mut Monitor, path: &str, s: &VirtVhostQueueStatus) {
    writeln!(mon, "{path}:");
    writeln!(mon, "  device_name:          {} (vhost)", s.name);
    writeln!(mon, "  kick:                 {}", s.kick);
    writeln!(mon, "  call:                 {}", s.call);
    mon.puts("  VRing:\n");
    writeln!(mon, "    num:         {}", s.num);
    writeln!(mon, "    desc:        {:#018x}", s.desc);
    writeln!(mon, "    desc_phys:   {:#018x}", s.desc_phys);
    writeln!(mon, "    desc_size:   {}", s.desc_size);
    writeln!(mon, "    avail:       {:#018x}", s.avail);
    writeln!(mon, "    avail_phys:  {:#018x}", s.avail_phys);
    writeln!(mon, "    avail_size:  {}", s.avail_size);
    writeln!(mon, "    used:        {:#018x}", s.used);
    writeln!(mon, "    used_phys:   {:#018x}", s.used_phys);
    writeln!(mon, "    used_size:   {}", s.used_size);
}

/// Render `x-query-virtio-queue-element`.
pub fn print_queue_element(mon: &mut Monitor, path: &str, e: &VirtioQueueElement) {
    writeln!(mon, "{path}:");
    writeln!(mon, "  device_name: {}", e.name);
    writeln!(mon, "  index:   {}", e.index);
    mon.puts("  desc:\n");
    mon.puts("    descs:\n");

    let mut descs = e.descs.iter().peekable();
    while let Some(d) = descs.next() {
        write!(mon, "        addr {:#x} len {}", d.addr, d.len);
        if let Some(flags) = d.flags.as_deref().filter(|f| !f.is_empty()) {
            write!(mon, " ({})", flags.join(", "));
        }
        if descs.peek().is_some() {
            mon.puts(",\n");
        }
    }
    mon.puts("\n");

    mon.puts("  avail:\n");
    writeln!(mon, "    flags: {}", e.avail.flags);
    writeln!(mon, "    idx:   {}", e.avail.idx);
    writeln!(mon, "    ring:  {}", e.avail.ring);
    mon.puts("  used:\n");
    writeln!(mon, "    flags: {}", e.used.flags);
    writeln!(mon, "    idx:   {}", e.used.idx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapi::types::{VirtioRingAvail, VirtioRingDesc, VirtioRingUsed};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn render(f: impl FnOnce(&mut Monitor)) -> String {
        let mut mon = Monitor::new();
        f(&mut mon);
        mon.take_output()
    }

    #[test]
    fn list_separators() {
        assert_eq!(render(|m| dump_list(m, &[])), "\n");
        assert_eq!(render(|m| dump_list(m, &strings(&["A"]))), "\tA\n");

        let out = render(|m| dump_list(m, &strings(&["A", "B", "C"])));
        assert_eq!(out, "\tA,\n\tB,\n\tC\n");
        assert_eq!(out.matches(",\n").count(), 2);
    }

    #[test]
    fn status_unknown_bits_are_padded() {
        let status = VirtioDeviceStatus {
            statuses: strings(&["VIRTIO_CONFIG_S_DRIVER_OK", "VIRTIO_CONFIG_S_FEATURES_OK"]),
            unknown_statuses: Some(0x40),
        };
        assert_eq!(
            render(|m| dump_status(m, &status)),
            "\tVIRTIO_CONFIG_S_DRIVER_OK,\n\tVIRTIO_CONFIG_S_FEATURES_OK\n  unknown-statuses(0x0000000000000040)\n"
        );
    }

    #[test]
    fn features_skip_empty_device_list() {
        let mut features = VirtioDeviceFeatures {
            transports: strings(&["VIRTIO_F_VERSION_1"]),
            dev_features: Some(Vec::new()),
            unknown_dev_features: None,
        };
        assert_eq!(render(|m| dump_features(m, &features)), "\tVIRTIO_F_VERSION_1\n");

        features.dev_features = Some(strings(&["VIRTIO_NET_F_MAC", "VIRTIO_NET_F_MQ"]));
        features.unknown_dev_features = Some(0x1_0000_0000);
        assert_eq!(
            render(|m| dump_features(m, &features)),
            "\tVIRTIO_F_VERSION_1\n\tVIRTIO_NET_F_MAC,\n\tVIRTIO_NET_F_MQ\n  unknown-features(0x0000000100000000)\n"
        );
    }

    #[test]
    fn protocols_unknown_bits() {
        let p = VhostDeviceProtocols {
            protocols: strings(&["VHOST_USER_PROTOCOL_F_MQ"]),
            unknown_protocols: Some(0xff),
        };
        assert_eq!(
            render(|m| dump_protocols(m, &p)),
            "\tVHOST_USER_PROTOCOL_F_MQ\n  unknown-protocols(0x00000000000000ff)\n"
        );
    }

    #[test]
    fn queue_status_hides_absent_indices() {
        let s = VirtQueueStatus {
            name: "virtio-net".into(),
            queue_index: 1,
            inuse: 0,
            vring_num: 256,
            vring_num_default: 256,
            vring_align: 4096,
            vring_desc: 0x7f8e_4000,
            vring_avail: 0x7f8e_5000,
            vring_used: 0x7f8e_5240,
            last_avail_idx: None,
            shadow_avail_idx: Some(12),
            used_idx: 12,
            signalled_used: 12,
            signalled_used_valid: true,
        };

        let out = render(|m| print_queue_status(m, "/machine/peripheral-anon/device[1]/virtio-backend", &s));
        assert!(!out.contains("last_avail_idx"));
        assert!(out.contains("  shadow_avail_idx:     12\n"));
        assert!(out.contains("    desc:         0x000000007f8e4000\n"));
        assert!(out.ends_with("    used:         0x000000007f8e5240\n"));
    }

    #[test]
    fn vhost_queue_status_layout() {
        let s = VirtVhostQueueStatus {
            name: "vhost-user-blk".into(),
            kick: 0,
            call: 0,
            desc: 0x7f31_c032_f000,
            avail: 0x7f31_c033_0000,
            used: 0x7f31_c033_0040,
            num: 128,
            desc_phys: 0x1_7d4c_8000,
            desc_size: 2048,
            avail_phys: 0x1_7d4c_8800,
            avail_size: 262,
            used_phys: 0x1_7d4c_8a00,
            used_size: 1030,
        };

        let out = render(|m| print_vhost_queue_status(m, "/machine/peripheral/vblk", &s));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "/machine/peripheral/vblk:");
        assert_eq!(lines[1], "  device_name:          vhost-user-blk (vhost)");
        assert_eq!(lines[4], "  VRing:");
        assert_eq!(lines[6], "    desc:        0x00007f31c032f000");
        assert_eq!(lines.len(), 15);
    }

    #[test]
    fn queue_element_flags_and_separators() {
        let e = VirtioQueueElement {
            name: "virtio-net".into(),
            index: 1,
            descs: vec![
                VirtioRingDesc {
                    addr: 0x1_2000,
                    len: 1536,
                    flags: Some(strings(&["write", "next"])),
                },
                VirtioRingDesc {
                    addr: 0x3f00,
                    len: 12,
                    flags: None,
                },
            ],
            avail: VirtioRingAvail {
                flags: 0,
                idx: 5,
                ring: 1,
            },
            used: VirtioRingUsed { flags: 1, idx: 4 },
        };

        let out = render(|m| print_queue_element(m, "/machine/peripheral/vio/virtio-backend", &e));
        assert_eq!(
            out,
            "/machine/peripheral/vio/virtio-backend:\n\
             \x20 device_name: virtio-net\n\
             \x20 index:   1\n\
             \x20 desc:\n\
             \x20   descs:\n\
             \x20       addr 0x12000 len 1536 (write, next),\n\
             \x20       addr 0x3f00 len 12\n\
             \x20 avail:\n\
             \x20   flags: 0\n\
             \x20   idx:   5\n\
             \x20   ring:  1\n\
             \x20 used:\n\
             \x20   flags: 1\n\
             \x20   idx:   4\n"
        );
    }

    #[test]
    fn empty_descriptor_flags_print_no_parenthesis() {
        let e = VirtioQueueElement {
            name: "virtio-blk".into(),
            index: 0,
            descs: vec![VirtioRingDesc {
                addr: 0x1000,
                len: 12,
                flags: Some(Vec::new()),
            }],
            avail: VirtioRingAvail {
                flags: 0,
                idx: 1,
                ring: 0,
            },
            used: VirtioRingUsed { flags: 0, idx: 0 },
        };

        let out = render(|m| print_queue_element(m, "/vio", &e));
        assert!(out.contains("        addr 0x1000 len 12\n"), "{out}");
        assert!(!out.contains("()"));
    }

    #[test]
    fn queue_numbers_must_fit() {
        assert_eq!(to_u16(65535), Ok(u16::MAX));
        assert_eq!(
            to_u16(-1).unwrap_err().to_string(),
            "invalid parameter value: -1"
        );
        assert!(queue_arg(&Args::new().with_int("queue", 70000), "queue").is_err());
    }
}
