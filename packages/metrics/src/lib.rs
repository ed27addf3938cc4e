pub mod counter;
pub mod gauge;
pub mod metric;
pub mod prometheus;
pub mod registry;
pub mod unit;

pub const METRICS_TARGET: &str = "METRICS";

#[cfg(test)]
mod tests {
    /// It removes the indentation of multi-line string literals.
    pub fn format_prometheus_output(output: &str) -> String {
        output.lines().map(str::trim).collect::<Vec<_>>().join("\n")
    }
}
