//! Kubernetes API version tracking and deprecation detection.
//!
//! A static table of deprecated API shapes keyed by (apiVersion, kind) with
//! the Kubernetes version each shape was deprecated and removed in. Lookups
//! are advisory: a hit means "this shape is deprecated for the target
//! cluster version", never a hard failure.

use std::fmt;

/// Kubernetes version as (major, minor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct K8sVersion {
    pub major: u32,
    pub minor: u32,
}

impl K8sVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse from a string like "1.25" or "v1.25".
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim_start_matches('v');
        let (major, minor) = s.split_once('.')?;
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.split('.').next()?.parse().ok()?,
        })
    }
}

impl fmt::Display for K8sVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Information about a deprecated API shape.
#[derive(Debug, Clone)]
pub struct DeprecatedApi {
    /// The deprecated API version (e.g., "extensions/v1beta1")
    pub api_version: &'static str,
    /// The kind this deprecation applies to (e.g., "Deployment")
    pub kind: &'static str,
    /// The replacement API version
    pub replacement: &'static str,
    /// Kubernetes version where this was deprecated
    pub deprecated_in: K8sVersion,
    /// Kubernetes version where this was removed
    pub removed_in: K8sVersion,
}

/// Static list of deprecated Kubernetes APIs.
static DEPRECATED_APIS: &[DeprecatedApi] = &[
    DeprecatedApi {
        api_version: "extensions/v1beta1",
        kind: "Deployment",
        replacement: "apps/v1",
        deprecated_in: K8sVersion { major: 1, minor: 9 },
        removed_in: K8sVersion {
            major: 1,
            minor: 16,
        },
    },
    DeprecatedApi {
        api_version: "extensions/v1beta1",
        kind: "DaemonSet",
        replacement: "apps/v1",
        deprecated_in: K8sVersion { major: 1, minor: 9 },
        removed_in: K8sVersion {
            major: 1,
            minor: 16,
        },
    },
    DeprecatedApi {
        api_version: "extensions/v1beta1",
        kind: "ReplicaSet",
        replacement: "apps/v1",
        deprecated_in: K8sVersion { major: 1, minor: 9 },
        removed_in: K8sVersion {
            major: 1,
            minor: 16,
        },
    },
    DeprecatedApi {
        api_version: "extensions/v1beta1",
        kind: "Ingress",
        replacement: "networking.k8s.io/v1",
        deprecated_in: K8sVersion {
            major: 1,
            minor: 14,
        },
        removed_in: K8sVersion {
            major: 1,
            minor: 22,
        },
    },
    DeprecatedApi {
        api_version: "networking.k8s.io/v1beta1",
        kind: "Ingress",
        replacement: "networking.k8s.io/v1",
        deprecated_in: K8sVersion {
            major: 1,
            minor: 19,
        },
        removed_in: K8sVersion {
            major: 1,
            minor: 22,
        },
    },
    DeprecatedApi {
        api_version: "apps/v1beta1",
        kind: "Deployment",
        replacement: "apps/v1",
        deprecated_in: K8sVersion { major: 1, minor: 9 },
        removed_in: K8sVersion {
            major: 1,
            minor: 16,
        },
    },
    DeprecatedApi {
        api_version: "apps/v1beta2",
        kind: "Deployment",
        replacement: "apps/v1",
        deprecated_in: K8sVersion { major: 1, minor: 9 },
        removed_in: K8sVersion {
            major: 1,
            minor: 16,
        },
    },
    DeprecatedApi {
        api_version: "policy/v1beta1",
        kind: "PodSecurityPolicy",
        replacement: "policy/v1",
        deprecated_in: K8sVersion {
            major: 1,
            minor: 21,
        },
        removed_in: K8sVersion {
            major: 1,
            minor: 25,
        },
    },
    DeprecatedApi {
        api_version: "policy/v1beta1",
        kind: "PodDisruptionBudget",
        replacement: "policy/v1",
        deprecated_in: K8sVersion {
            major: 1,
            minor: 21,
        },
        removed_in: K8sVersion {
            major: 1,
            minor: 25,
        },
    },
    DeprecatedApi {
        api_version: "autoscaling/v2beta1",
        kind: "HorizontalPodAutoscaler",
        replacement: "autoscaling/v2",
        deprecated_in: K8sVersion {
            major: 1,
            minor: 22,
        },
        removed_in: K8sVersion {
            major: 1,
            minor: 25,
        },
    },
    DeprecatedApi {
        api_version: "autoscaling/v2beta2",
        kind: "HorizontalPodAutoscaler",
        replacement: "autoscaling/v2",
        deprecated_in: K8sVersion {
            major: 1,
            minor: 23,
        },
        removed_in: K8sVersion {
            major: 1,
            minor: 26,
        },
    },
    DeprecatedApi {
        api_version: "batch/v1beta1",
        kind: "CronJob",
        replacement: "batch/v1",
        deprecated_in: K8sVersion {
            major: 1,
            minor: 21,
        },
        removed_in: K8sVersion {
            major: 1,
            minor: 25,
        },
    },
];

/// Look up the deprecation entry for an API shape, if the shape is
/// deprecated as of `target`.
#[must_use]
pub fn deprecation_for(api_version: &str, kind: &str, target: K8sVersion) -> Option<&'static DeprecatedApi> {
    DEPRECATED_APIS
        .iter()
        .find(|d| d.api_version == api_version && d.kind == kind && target >= d.deprecated_in)
}

#[cfg(test)]
#[path = "k8s_tests.rs"]
mod tests;
