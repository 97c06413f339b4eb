//! Host object model, as seen by the monitor.
//!
//! Objects form a tree rooted at the machine. Some objects implement extra
//! interfaces; the only one the monitor cares about is
//! [`InterruptStatsProvider`].

use crate::monitor::Monitor;

/// A node of the host object tree.
pub trait HostObject {
    /// Concrete type name, e.g. `kvm-i8259`.
    fn type_name(&self) -> &str;

    /// Direct children, in insertion order.
    fn children(&self) -> Vec<&dyn HostObject>;

    /// The interrupt statistics interface, when this object implements it.
    fn as_interrupt_stats(&self) -> Option<&dyn InterruptStatsProvider> {
        None
    }
}

/// Interface of interrupt controllers that can describe their state.
pub trait InterruptStatsProvider {
    /// Print controller state to `mon`.
    ///
    /// Returns `false`, without printing, when the controller registered no
    /// printer.
    fn print_info(&self, mon: &mut Monitor) -> bool;
}

/// Machine-wide lookups.
pub trait Machine {
    /// Canonical object path of the vCPU with this index, if it exists.
    fn cpu_path(&self, index: i64) -> Option<String>;

    /// Root of the object tree.
    fn object_root(&self) -> &dyn HostObject;
}

/// Visit every object below `root` depth-first, parents before children.
///
/// `root` itself is not visited.
pub fn for_each_child_recursive(root: &dyn HostObject, f: &mut dyn FnMut(&dyn HostObject)) {
    for child in root.children() {
        f(child);
        for_each_child_recursive(child, f);
    }
}
