//! Run-state control, simple queries and the remaining one-line commands.

use super::{Hmp, check, handle_error};
use crate::{
    args::Args,
    error::{Error, Result},
    machine::{HostObject, Machine, for_each_child_recursive},
    mapi::{
        Mapi,
        types::{ChangeMedium, ReadOnlyMode, RunState, TpmOptions},
    },
    monitor::Monitor,
};

impl<H: Mapi + Machine> Hmp<H> {
    /// `info name`: the machine name, if one was set.
    pub fn info_name(&self, mon: &mut Monitor) {
        if let Some(info) = check(mon, self.host.query_name()) {
            if let Some(name) = info.name {
                writeln!(mon, "{name}");
            }
        }
    }

    /// `info version`.
    pub fn info_version(&self, mon: &mut Monitor) {
        if let Some(info) = check(mon, self.host.query_version()) {
            let v = info.qemu;
            writeln!(mon, "{}.{}.{}{}", v.major, v.minor, v.micro, info.package);
        }
    }

    /// `info status`.
    pub fn info_status(&self, mon: &mut Monitor) {
        let Some(info) = check(mon, self.host.query_status()) else {
            return;
        };

        write!(
            mon,
            "VM status: {}{}",
            if info.running { "running" } else { "paused" },
            if info.singlestep { " (single step mode)" } else { "" }
        );

        if !info.running && info.status != RunState::Paused {
            write!(mon, " ({})", info.status);
        }

        mon.puts("\n");
    }

    /// `info pic`: every interrupt controller that can describe itself.
    pub fn info_pic(&self, mon: &mut Monitor) {
        for_each_child_recursive(self.host.object_root(), &mut |obj: &dyn HostObject| {
            if let Some(intc) = obj.as_interrupt_stats() {
                if !intc.print_info(mon) {
                    writeln!(
                        mon,
                        "Interrupt controller information not available for {}.",
                        obj.type_name()
                    );
                }
            }
        });
    }

    /// `info tpm`.
    pub fn info_tpm(&self, mon: &mut Monitor) {
        if !self.caps.tpm {
            mon.puts("TPM device not supported\n");
            return;
        }

        let Some(list) = check(mon, self.host.query_tpm()) else {
            return;
        };

        if !list.is_empty() {
            mon.puts("TPM device:\n");
        }

        for (c, ti) in list.iter().enumerate() {
            writeln!(mon, " tpm{c}: model={}", ti.model);
            write!(mon, "  \\ {}: type={}", ti.id, ti.options.kind());

            match &ti.options {
                TpmOptions::Passthrough(tpo) => {
                    if let Some(path) = &tpo.path {
                        write!(mon, ",path={path}");
                    }
                    if let Some(cancel_path) = &tpo.cancel_path {
                        write!(mon, ",cancel-path={cancel_path}");
                    }
                }
                TpmOptions::Emulator(teo) => write!(mon, ",chardev={}", teo.chardev),
            }
            mon.puts("\n");
        }
    }

    /// `info iothreads`.
    pub fn info_iothreads(&self, mon: &mut Monitor) {
        let Some(list) = check(mon, self.host.query_iothreads()) else {
            return;
        };

        for t in &list {
            writeln!(mon, "{}:", t.id);
            writeln!(mon, "  thread_id={}", t.thread_id);
            writeln!(mon, "  poll-max-ns={}", t.poll_max_ns);
            writeln!(mon, "  poll-grow={}", t.poll_grow);
            writeln!(mon, "  poll-shrink={}", t.poll_shrink);
            writeln!(mon, "  aio-max-batch={}", t.aio_max_batch);
        }
    }

    /// `quit`: stop taking commands on this session, then ask the host to exit.
    pub fn quit(&self, mon: &mut Monitor) {
        mon.suspend();
        handle_error(mon, self.host.quit().err());
    }

    /// `stop`.
    pub fn stop(&self, mon: &mut Monitor) {
        handle_error(mon, self.host.stop().err());
    }

    /// `cont`.
    pub fn cont(&self, mon: &mut Monitor) {
        handle_error(mon, self.host.cont().err());
    }

    /// `exit-preconfig`.
    pub fn exit_preconfig(&self, mon: &mut Monitor) {
        handle_error(mon, self.host.x_exit_preconfig().err());
    }

    /// `cpu index`: select the session's current vCPU.
    pub fn cpu(&self, mon: &mut Monitor, args: &Args) -> Result<()> {
        let index = args.get_int("index")?;

        if self.host.cpu_path(index).is_some() {
            mon.set_cpu_index(index);
        } else {
            mon.puts("invalid CPU index\n");
        }
        Ok(())
    }

    /// `getfd fdname`.
    pub fn getfd(&self, mon: &mut Monitor, args: &Args) -> Result<()> {
        let fdname = args.get_str("fdname")?;
        handle_error(mon, self.host.getfd(fdname).err());
        Ok(())
    }

    /// `closefd fdname`.
    pub fn closefd(&self, mon: &mut Monitor, args: &Args) -> Result<()> {
        let fdname = args.get_str("fdname")?;
        handle_error(mon, self.host.closefd(fdname).err());
        Ok(())
    }

    /// `sync-profile [on|off|reset]`; prints the current state without an op.
    pub fn sync_profile(&self, mon: &mut Monitor, args: &Args) {
        match args.try_str("op") {
            None => {
                let state = if self.profiler.is_enabled() { "on" } else { "off" };
                writeln!(mon, "sync-profile is {state}");
            }
            Some("on") => self.profiler.enable(),
            Some("off") => self.profiler.disable(),
            Some("reset") => self.profiler.reset(),
            Some(op) => {
                handle_error(mon, Some(Error::InvalidParameter(op.to_string())));
            }
        }
    }

    /// `change device target [arg] [read-only-mode] [force]`.
    ///
    /// `vnc` changes the VNC password when VNC is available; any other device
    /// gets a new medium.
    pub fn change(&self, mon: &mut Monitor, args: &Args) -> Result<()> {
        let device = args.get_str("device")?;
        let target = args.get_str("target")?;
        let arg = args.try_str("arg");
        let read_only = args.try_str("read-only-mode");
        let force = args.try_bool("force", false);

        let res = if self.caps.vnc && device == "vnc" {
            self.change_vnc(target, arg, read_only)
        } else {
            self.change_medium(device, target, arg, read_only, force)
        };

        handle_error(mon, res.err());
        Ok(())
    }

    fn change_vnc(&self, target: &str, arg: Option<&str>, read_only: Option<&str>) -> Result<()> {
        if read_only.is_some() {
            return Err(Error::generic(
                "Parameter 'read-only-mode' is invalid for VNC",
            ));
        }
        if target != "passwd" && target != "password" {
            return Err(Error::generic("Expected 'password' after 'vnc'"));
        }
        let Some(password) = arg else {
            return Err(Error::generic(
                "terminal does not support password prompting",
            ));
        };

        self.host.change_vnc_password(password)
    }

    fn change_medium(
        &self,
        device: &str,
        target: &str,
        arg: Option<&str>,
        read_only: Option<&str>,
        force: bool,
    ) -> Result<()> {
        let read_only_mode = read_only.map(str::parse::<ReadOnlyMode>).transpose()?;

        self.host.blockdev_change_medium(&ChangeMedium {
            device: device.to_string(),
            filename: target.to_string(),
            format: arg.map(str::to_owned),
            force,
            read_only_mode,
        })
    }
}
