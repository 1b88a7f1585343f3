//! Resolution of process-level settings from the environment.
//!
//! Nothing here runs implicitly. Call [`Settings::from_env`] once at startup
//! and pass the result to whatever builds your generator, so tests can supply
//! their own values through [`Settings::from_lookup`] instead of mutating the
//! process environment.
//!
//! Both lookups degrade to documented fallbacks instead of failing: a bad
//! machine ID falls through to address detection and then to `0`, and a bad
//! start time falls back to [`Epoch::DEFAULT`]. Deployments that need
//! distinct discriminators across a fleet must set them explicitly; two
//! processes with the same discriminator are not detected.

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

use crate::{generator::Generator, layout::BitLayout, time::Epoch};

/// Environment variable holding an explicit discriminator (decimal integer).
pub const MACHINE_ID_ENV: &str = "FASTID_MACHINE_ID";

/// Environment variable holding the generation start epoch (RFC 3339).
pub const START_TIME_ENV: &str = "FASTID_START_TIME";

/// Discriminator used when neither an override nor a private address is
/// available.
pub const FALLBACK_DISCRIMINATOR: i64 = 0;

/// Settings read from the environment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    /// Explicit discriminator, if one was configured and parsed.
    pub discriminator: Option<i64>,
    /// Generation start epoch.
    pub epoch: Epoch,
}

impl Settings {
    /// Reads [`MACHINE_ID_ENV`] and [`START_TIME_ENV`] from the process
    /// environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    ///
    /// # Example
    /// ```
    /// use fastid::{Epoch, Settings};
    ///
    /// let settings = Settings::from_lookup(|key| match key {
    ///     "FASTID_MACHINE_ID" => Some("42".to_owned()),
    ///     _ => None,
    /// });
    /// assert_eq!(settings.discriminator, Some(42));
    /// assert_eq!(settings.epoch, Epoch::DEFAULT);
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let discriminator = lookup(MACHINE_ID_ENV).and_then(|raw| {
            raw.trim()
                .parse::<i64>()
                .inspect_err(|err| {
                    tracing::warn!(
                        key = MACHINE_ID_ENV,
                        value = %raw,
                        %err,
                        "ignoring unparseable machine id"
                    );
                })
                .ok()
        });
        let epoch = lookup(START_TIME_ENV).map_or(Epoch::DEFAULT, |raw| Epoch::parse(&raw));

        Self {
            discriminator,
            epoch,
        }
    }

    /// Resolves the discriminator: the explicit override if set, otherwise
    /// the low two octets of a private IPv4 address reported by `source`,
    /// otherwise [`FALLBACK_DISCRIMINATOR`].
    pub fn resolve_discriminator(&self, source: &impl AddressSource) -> i64 {
        resolve_discriminator(self.discriminator, source)
    }

    /// Builds a generator from a layout preset and these settings, detecting
    /// the host address with [`InterfaceProbe`] when no discriminator is set.
    ///
    /// # Example
    /// ```
    /// use fastid::{BitLayout, Settings};
    ///
    /// let settings = Settings { discriminator: Some(300), ..Settings::default() };
    /// let generator = settings.generator(BitLayout::benchmark);
    /// assert_eq!(generator.layout().discriminator(), 44);
    /// ```
    pub fn generator(&self, preset: impl FnOnce(i64) -> BitLayout) -> Generator {
        let layout = preset(self.resolve_discriminator(&InterfaceProbe::default()));
        tracing::debug!(
            discriminator = layout.discriminator(),
            epoch = self.epoch.as_nanos(),
            "building generator"
        );
        Generator::new(layout, self.epoch)
    }
}

/// Reports the IPv4 addresses of the host's network interfaces.
pub trait AddressSource {
    fn ipv4_addrs(&self) -> Vec<Ipv4Addr>;
}

impl AddressSource for [Ipv4Addr] {
    fn ipv4_addrs(&self) -> Vec<Ipv4Addr> {
        self.to_vec()
    }
}

impl<const N: usize> AddressSource for [Ipv4Addr; N] {
    fn ipv4_addrs(&self) -> Vec<Ipv4Addr> {
        self.to_vec()
    }
}

/// Discovers local interface addresses by asking the OS which source address
/// it would use to reach a set of probe targets.
///
/// Connecting a UDP socket only consults the routing table; no packet is
/// sent. Targets without a route are skipped.
///
/// This is not a full interface listing: only the source address of a route
/// to one of the targets is reported. A private address on an interface
/// that routes to none of them is missed, so hosts like that should set
/// [`MACHINE_ID_ENV`] or pass their own [`AddressSource`].
#[derive(Clone, Debug)]
pub struct InterfaceProbe {
    targets: Vec<SocketAddr>,
}

impl Default for InterfaceProbe {
    fn default() -> Self {
        Self::new(
            [
                Ipv4Addr::new(10, 254, 254, 254),
                Ipv4Addr::new(172, 31, 254, 254),
                Ipv4Addr::new(192, 168, 254, 254),
                Ipv4Addr::new(192, 0, 2, 1),
            ]
            .into_iter()
            .map(|ip| SocketAddr::from((ip, 9))),
        )
    }
}

impl InterfaceProbe {
    pub fn new(targets: impl IntoIterator<Item = SocketAddr>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
        }
    }
}

impl AddressSource for InterfaceProbe {
    fn ipv4_addrs(&self) -> Vec<Ipv4Addr> {
        let mut found = Vec::new();
        for target in &self.targets {
            let local = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
                .and_then(|socket| socket.connect(target).map(|()| socket))
                .and_then(|socket| socket.local_addr());
            match local {
                Ok(SocketAddr::V4(addr)) if !found.contains(addr.ip()) => found.push(*addr.ip()),
                Ok(_) => {}
                Err(err) => tracing::trace!(probe = %target, %err, "no route to probe target"),
            }
        }
        found
    }
}

/// Derives a discriminator from the first private (RFC 1918), non-loopback
/// address: `(third_octet << 8) + fourth_octet`.
///
/// # Example
/// ```
/// use std::net::Ipv4Addr;
/// use fastid::discriminator_from_addrs;
///
/// let addrs = [Ipv4Addr::new(8, 8, 8, 8), Ipv4Addr::new(172, 20, 3, 7)];
/// assert_eq!(discriminator_from_addrs(&addrs), Some((3 << 8) + 7));
/// ```
pub fn discriminator_from_addrs(addrs: &[Ipv4Addr]) -> Option<i64> {
    addrs
        .iter()
        .find(|ip| ip.is_private() && !ip.is_loopback())
        .map(|ip| {
            let [_, _, hi, lo] = ip.octets();
            (i64::from(hi) << 8) + i64::from(lo)
        })
}

/// Resolves a discriminator from an explicit override, then `source`, then
/// [`FALLBACK_DISCRIMINATOR`].
///
/// The result is not masked; [`BitLayout`] masks it to its own width.
pub fn resolve_discriminator(explicit: Option<i64>, source: &(impl AddressSource + ?Sized)) -> i64 {
    if let Some(discriminator) = explicit {
        tracing::debug!(discriminator, "using configured discriminator");
        return discriminator;
    }

    let addrs = source.ipv4_addrs();
    match discriminator_from_addrs(&addrs) {
        Some(discriminator) => {
            tracing::debug!(discriminator, "derived discriminator from private address");
            discriminator
        }
        None => {
            tracing::warn!(
                fallback = FALLBACK_DISCRIMINATOR,
                "no machine id configured and no private IPv4 address found"
            );
            FALLBACK_DISCRIMINATOR
        }
    }
}
