use hmp::mock::{MockHost, MockScript};
use hmp::{Args, Hmp, Monitor};
use serde_json::{Value, json};

const VBLK: &str = "/machine/peripheral/vblk/virtio-backend";

fn run(hmp: &Hmp<MockHost>, command: &str, args: &Args) -> String {
    let mut mon = Monitor::new();
    hmp.execute(&mut mon, command, args);
    mon.take_output()
}

fn features(transports: &[&str], dev: &[&str]) -> Value {
    json!({"transports": transports, "dev-features": dev})
}

fn device_status(vhost: Option<Value>) -> Value {
    let mut status = json!({
        "name": "virtio-blk",
        "device-id": 2,
        "vhost-started": vhost.is_some(),
        "device-endian": "little",
        "guest-features": features(&["VIRTIO_F_VERSION_1"], &["VIRTIO_BLK_F_SEG_MAX"]),
        "host-features": features(&["VIRTIO_F_VERSION_1", "VIRTIO_RING_F_EVENT_IDX"], &[]),
        "backend-features": {"transports": [], "unknown-dev-features": 0},
        "num-vqs": 1,
        "status": {"statuses": ["VIRTIO_CONFIG_S_DRIVER_OK"]},
        "isr": 0,
        "queue-sel": 0,
        "vm-running": true,
        "broken": false,
        "disabled": false,
        "use-started": true,
        "started": true,
        "start-on-kick": false,
        "disable-legacy-check": false,
        "bus-name": "",
        "use-guest-notifier-mask": true
    });
    if let Some(v) = vhost {
        status["vhost-dev"] = v;
    }
    status
}

#[test]
fn info_virtio_lists_devices() {
    let hmp = Hmp::new(MockHost::new(MockScript::new().reply_return(
        "x-query-virtio",
        json!([
            {"path": VBLK, "name": "virtio-blk"},
            {"path": "/machine/peripheral-anon/device[0]/virtio-backend", "name": "virtio-net"}
        ]),
    )));

    assert_eq!(
        run(&hmp, "info virtio", &Args::new()),
        format!(
            "{VBLK} [virtio-blk]\n/machine/peripheral-anon/device[0]/virtio-backend [virtio-net]\n"
        )
    );
}

#[test]
fn info_virtio_without_devices() {
    let hmp = Hmp::new(MockHost::new(
        MockScript::new().reply_return("x-query-virtio", json!([])),
    ));
    assert_eq!(run(&hmp, "info virtio", &Args::new()), "No VirtIO devices\n");
}

#[test]
fn virtio_status_plain_device() {
    let hmp = Hmp::new(MockHost::new(
        MockScript::new().reply_return("x-query-virtio-status", device_status(None)),
    ));

    let out = run(&hmp, "virtio status", &Args::new().with_str("path", VBLK));

    assert_eq!(
        out,
        format!(
            "{VBLK}:\n\
             \x20 device_name:             virtio-blk \n\
             \x20 device_id:               2\n\
             \x20 vhost_started:           false\n\
             \x20 bus_name:                \n\
             \x20 broken:                  false\n\
             \x20 disabled:                false\n\
             \x20 disable_legacy_check:    false\n\
             \x20 started:                 true\n\
             \x20 use_started:             true\n\
             \x20 start_on_kick:           false\n\
             \x20 use_guest_notifier_mask: true\n\
             \x20 vm_running:              true\n\
             \x20 num_vqs:                 1\n\
             \x20 queue_sel:               0\n\
             \x20 isr:                     0\n\
             \x20 endianness:              little\n\
             \x20 status:\n\
             \tVIRTIO_CONFIG_S_DRIVER_OK\n\
             \x20 Guest features:\n\
             \tVIRTIO_F_VERSION_1\n\
             \tVIRTIO_BLK_F_SEG_MAX\n\
             \x20 Host features:\n\
             \tVIRTIO_F_VERSION_1,\n\
             \tVIRTIO_RING_F_EVENT_IDX\n\
             \x20 Backend features:\n\
             \n\
             \x20 unknown-features(0x0000000000000000)\n"
        )
    );
    assert_eq!(
        hmp.host().last_arguments("x-query-virtio-status"),
        Some(json!({"path": VBLK}))
    );
}

#[test]
fn virtio_status_vhost_block() {
    let vhost = json!({
        "n-mem-sections": 4,
        "n-tmp-sections": 4,
        "nvqs": 1,
        "vq-index": 0,
        "features": features(&["VIRTIO_F_VERSION_1"], &[]),
        "acked-features": features(&["VIRTIO_F_VERSION_1"], &[]),
        "backend-features": {"transports": []},
        "protocol-features": {"protocols": ["VHOST_USER_PROTOCOL_F_MQ"], "unknown-protocols": 16},
        "max-queues": 1,
        "backend-cap": 2,
        "log-enabled": false,
        "log-size": 0
    });
    let hmp = Hmp::new(MockHost::new(
        MockScript::new().reply_return("x-query-virtio-status", device_status(Some(vhost))),
    ));

    let out = run(&hmp, "virtio status", &Args::new().with_str("path", VBLK));

    assert!(out.contains("  device_name:             virtio-blk (vhost)\n"));
    assert!(out.contains("  vhost_started:           true\n"));
    let tail = out
        .split_once("  VHost:\n")
        .map(|(_, t)| t)
        .unwrap_or_default();
    assert_eq!(
        tail,
        "    nvqs:           1\n\
         \x20   vq_index:       0\n\
         \x20   max_queues:     1\n\
         \x20   n_mem_sections: 4\n\
         \x20   n_tmp_sections: 4\n\
         \x20   backend_cap:    2\n\
         \x20   log_enabled:    false\n\
         \x20   log_size:       0\n\
         \x20   Features:\n\
         \tVIRTIO_F_VERSION_1\n\
         \x20   Acked features:\n\
         \tVIRTIO_F_VERSION_1\n\
         \x20   Backend features:\n\
         \n\
         \x20   Protocol features:\n\
         \tVHOST_USER_PROTOCOL_F_MQ\n\
         \x20 unknown-protocols(0x0000000000000010)\n"
    );
}

#[test]
fn queue_element_renders_descriptor_chain() {
    let hmp = Hmp::new(MockHost::new(MockScript::new().reply_return(
        "x-query-virtio-queue-element",
        json!({
            "name": "virtio-blk",
            "index": 1,
            "descs": [
                {"addr": 0x7ff2_a000_u64, "len": 16, "flags": ["write", "next"]},
                {"addr": 0x7ff2_b000_u64, "len": 512}
            ],
            "avail": {"flags": 0, "idx": 2, "ring": 1},
            "used": {"flags": 0, "idx": 1}
        }),
    )));
    let path = "/machine/peripheral/vio/virtio-backend";
    let args = Args::new()
        .with_str("path", path)
        .with_int("queue", 0)
        .with_int("index", 1);

    let out = run(&hmp, "virtio queue-element", &args);

    assert_eq!(
        out,
        format!(
            "{path}:\n\
             \x20 device_name: virtio-blk\n\
             \x20 index:   1\n\
             \x20 desc:\n\
             \x20   descs:\n\
             \x20       addr 0x7ff2a000 len 16 (write, next),\n\
             \x20       addr 0x7ff2b000 len 512\n\
             \x20 avail:\n\
             \x20   flags: 0\n\
             \x20   idx:   2\n\
             \x20   ring:  1\n\
             \x20 used:\n\
             \x20   flags: 0\n\
             \x20   idx:   1\n"
        )
    );
    assert_eq!(
        hmp.host().last_arguments("x-query-virtio-queue-element"),
        Some(json!({"path": path, "queue": 0, "index": 1}))
    );
}

#[test]
fn queue_element_defaults_to_head() {
    let hmp = Hmp::new(MockHost::new(MockScript::new().reply_error(
        "x-query-virtio-queue-element",
        "GenericError",
        "Queue is empty",
    )));

    let args = Args::new().with_str("path", VBLK).with_int("queue", 0);
    assert_eq!(
        run(&hmp, "virtio queue-element", &args),
        "Error: Queue is empty\n"
    );
    assert_eq!(
        hmp.host().last_arguments("x-query-virtio-queue-element"),
        Some(json!({"path": VBLK, "queue": 0}))
    );
}

#[test]
fn queue_status_passes_queue_number() {
    let hmp = Hmp::new(MockHost::new(MockScript::new().reply_return(
        "x-query-virtio-queue-status",
        json!({
            "name": "virtio-blk",
            "queue-index": 0,
            "inuse": 0,
            "vring-num": 256,
            "vring-num-default": 256,
            "vring-align": 4096,
            "vring-desc": 0x1_0000_u64,
            "vring-avail": 0x1_1000_u64,
            "vring-used": 0x1_1240_u64,
            "last-avail-idx": 7,
            "shadow-avail-idx": 7,
            "used-idx": 7,
            "signalled-used": 7,
            "signalled-used-valid": false
        }),
    )));

    let out = run(
        &hmp,
        "virtio queue-status",
        &Args::new().with_str("path", VBLK).with_int("queue", 0),
    );

    assert!(out.starts_with(&format!("{VBLK}:\n  device_name:          virtio-blk\n")));
    assert!(out.contains("  last_avail_idx:       7\n  shadow_avail_idx:     7\n  VRing:\n"));
    assert!(out.contains("    avail:        0x0000000000011000\n"));
    assert_eq!(
        hmp.host().last_arguments("x-query-virtio-queue-status"),
        Some(json!({"path": VBLK, "queue": 0}))
    );
}

#[test]
fn vhost_queue_status_error_is_relayed() {
    let hmp = Hmp::new(MockHost::new(MockScript::new().reply_error(
        "x-query-virtio-vhost-queue-status",
        "GenericError",
        "Path /machine/peripheral/vblk/virtio-backend is not a vhost device",
    )));

    let out = run(
        &hmp,
        "vhost queue-status",
        &Args::new().with_str("path", VBLK).with_int("queue", 1),
    );
    assert_eq!(
        out,
        "Error: Path /machine/peripheral/vblk/virtio-backend is not a vhost device\n"
    );
}

#[test]
fn out_of_range_queue_is_rejected() {
    let hmp = Hmp::new(MockHost::new(MockScript::new()));

    let out = run(
        &hmp,
        "virtio queue-status",
        &Args::new().with_str("path", VBLK).with_int("queue", 65536),
    );
    assert_eq!(out, "Error: invalid parameter value: 65536\n");
    assert!(hmp.host().calls().is_empty());
}
