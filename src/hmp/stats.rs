//! `info stats`: filter construction and schema-driven rendering.
//!
//! A stats query is answered in two parts: the schema (names, units and
//! scaling of every statistic a provider exposes) and the values. Values are
//! reported in schema order but only for the names that were asked for, so
//! the renderer walks both lists with forward-only cursors.

use super::{Hmp, check, split_at_comma};
use crate::{
    args::Args,
    error::Result,
    machine::Machine,
    mapi::{
        Mapi,
        types::{
            StatsFilter, StatsProvider, StatsRequest, StatsResult, StatsSchema, StatsSchemaValue,
            StatsTarget, StatsType, StatsUnit, StatsValue,
        },
    },
    monitor::Monitor,
};

impl<H: Mapi + Machine> Hmp<H> {
    /// `info stats target [provider] [names]`.
    ///
    /// The `vcpu` target reports on the session's current vCPU.
    pub fn info_stats(&self, mon: &mut Monitor, args: &Args) -> Result<()> {
        let target_str = args.get_str("target")?;
        let provider_str = args.try_str("provider");
        let names = args.try_str("names");

        let Ok(target) = target_str.parse::<StatsTarget>() else {
            writeln!(mon, "invalid stats target {target_str}");
            return Ok(());
        };
        let provider = match provider_str {
            None => None,
            Some(s) => match s.parse::<StatsProvider>() {
                Ok(p) => Some(p),
                Err(_) => {
                    writeln!(mon, "invalid stats provider {s}");
                    return Ok(());
                }
            },
        };

        let Some(schema) = check(mon, self.host.query_stats_schemas(provider)) else {
            return Ok(());
        };

        let filter = stats_filter(&self.host, target, names, mon.cpu_index(), provider);

        let Some(results) = check(mon, self.host.query_stats(&filter)) else {
            return Ok(());
        };

        for result in &results {
            print_stats_results(mon, target, provider.is_none(), result, &schema);
        }
        Ok(())
    }
}

/// Build the `query-stats` filter for an `info stats` invocation.
///
/// `cpu_index` is only used for the `vcpu` target. Without `names` and
/// `provider` the filter selects everything; otherwise it carries one request
/// per selected provider, because a name list only has meaning within one
/// provider's namespace. `names == "*"` selects every name.
pub fn stats_filter(
    machine: &dyn Machine,
    target: StatsTarget,
    names: Option<&str>,
    cpu_index: i64,
    provider: Option<StatsProvider>,
) -> StatsFilter {
    let mut filter = StatsFilter::new(target);

    if target == StatsTarget::Vcpu {
        // An unknown index yields an empty list; the query then rejects it.
        filter.vcpus = Some(machine.cpu_path(cpu_index).into_iter().collect());
    }

    if names.is_none() && provider.is_none() {
        return filter;
    }

    let requests = StatsProvider::ALL
        .iter()
        .copied()
        .filter(|p| provider.is_none_or(|wanted| wanted == *p))
        .map(|p| StatsRequest {
            provider: p,
            names: names.filter(|n| *n != "*").map(|n| split_at_comma(Some(n))),
        })
        .collect();

    filter.providers = Some(requests);
    filter
}

fn find_schema_value_list(
    schema: &[StatsSchema],
    provider: StatsProvider,
    target: StatsTarget,
) -> Option<&[StatsSchemaValue]> {
    schema
        .iter()
        .find(|s| s.provider == provider && s.target == target)
        .map(|s| s.stats.as_slice())
}

/// Print one provider's results using the matching schema.
///
/// Stops at the first statistic that has no schema entry left; later
/// results are unaffected.
pub fn print_stats_results(
    mon: &mut Monitor,
    target: StatsTarget,
    show_provider: bool,
    result: &StatsResult,
    schema: &[StatsSchema],
) {
    let Some(values) = find_schema_value_list(schema, result.provider, target) else {
        #[cfg(feature = "tracing")]
        tracing::warn!(provider = %result.provider, target = %target, "no stats schema");
        writeln!(mon, "failed to find schema list for {}", result.provider);
        return;
    };

    if show_provider {
        writeln!(mon, "provider: {}", result.provider);
    }

    // `find` consumes up to and including the match, so the cursor never
    // moves backwards.
    let mut cursor = values.iter();
    for stats in &result.stats {
        let Some(schema_value) = cursor.find(|v| v.name == stats.name) else {
            #[cfg(feature = "tracing")]
            tracing::warn!(provider = %result.provider, name = %stats.name, "no stats schema entry");
            writeln!(mon, "failed to find schema entry for {}", stats.name);
            return;
        };

        print_stats_schema_value(mon, schema_value);

        match &stats.value {
            StatsValue::Scalar(v) => writeln!(mon, ": {v}"),
            StatsValue::Boolean(b) => writeln!(mon, ": {}", if *b { "yes" } else { "no" }),
            StatsValue::List(list) => {
                mon.puts(": ");
                for (i, v) in list.iter().enumerate() {
                    write!(mon, "[{}]={v} ", i + 1);
                }
                mon.puts("\n");
            }
        }
    }
}

/// Print `    name (type[, unit])` for one schema entry.
///
/// Seconds and bytes get a unit letter with an SI or IEC prefix when the
/// scale allows one; any other scale is spelled out as `* base^exponent`
/// followed by the unit's name.
pub fn print_stats_schema_value(mon: &mut Monitor, value: &StatsSchemaValue) {
    let sep = if value.unit.is_some() || value.exponent != 0 {
        ", "
    } else {
        ""
    };
    write!(mon, "    {} ({}{sep}", value.name, value.kind);

    let mut unit = match value.unit {
        Some(StatsUnit::Seconds) => Some("s"),
        Some(StatsUnit::Bytes) => Some("B"),
        _ => None,
    };

    let exp = value.exponent;
    if unit.is_some() && value.base == 10 && (-18..=18).contains(&exp) && exp % 3 == 0 {
        mon.puts(si_prefix(exp));
    } else if unit.is_some() && value.base == 2 && (0..=60).contains(&exp) && exp % 10 == 0 {
        mon.puts(iec_binary_prefix(exp));
    } else if exp != 0 {
        let space = if value.unit.is_some() { " " } else { "" };
        write!(mon, "* {}^{exp}{space}", value.base);
        unit = None;
    }

    if let Some(u) = value.unit {
        mon.puts(unit.unwrap_or(u.as_str()));
    }

    if value.kind == StatsType::LinearHistogram {
        if let Some(size) = value.bucket_size {
            write!(mon, ", bucket size={size}");
        }
    }
    mon.puts(")");
}

/// SI prefix for a power of ten that is a multiple of 3 in `-18..=18`.
fn si_prefix(exp10: i16) -> &'static str {
    match exp10 {
        -18 => "a",
        -15 => "f",
        -12 => "p",
        -9 => "n",
        -6 => "u",
        -3 => "m",
        3 => "k",
        6 => "M",
        9 => "G",
        12 => "T",
        15 => "P",
        18 => "E",
        _ => "",
    }
}

/// IEC prefix for a power of two that is a multiple of 10 in `0..=60`.
fn iec_binary_prefix(exp2: i16) -> &'static str {
    match exp2 {
        10 => "Ki",
        20 => "Mi",
        30 => "Gi",
        40 => "Ti",
        50 => "Pi",
        60 => "Ei",
        _ => "",
    }
}
