/// Content type of the Prometheus text exposition format.
pub const TEXT_FORMAT_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

pub trait PrometheusSerializable {
    /// Convert the implementing type into a Prometheus exposition format string.
    fn to_prometheus(&self) -> String;
}

impl<T: PrometheusSerializable> PrometheusSerializable for &T {
    fn to_prometheus(&self) -> String {
        (*self).to_prometheus()
    }
}
