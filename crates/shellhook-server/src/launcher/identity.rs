//! Resolution of a named OS user and privilege drop for the child process.
//!
//! [`IdentityResolver`] is the narrow seam: the launcher only needs numeric
//! ids for a username. [`SystemIdentities`] reads the system user database;
//! on platforms without one it reports an explicit unsupported error.

use std::path::Path;

use tokio::process::Command;

use super::error::LaunchError;

/// Numeric identity a child process runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: u32,
    pub gid: u32,
    /// Supplementary group ids, primary group included.
    pub groups: Vec<u32>,
}

/// Resolves usernames to numeric identities.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, username: &str) -> Result<Identity, LaunchError>;
}

/// Resolver backed by `getpwnam_r(3)` and `getgrouplist(3)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemIdentities;

#[cfg(unix)]
impl IdentityResolver for SystemIdentities {
    fn resolve(&self, username: &str) -> Result<Identity, LaunchError> {
        sys::lookup(username).map_err(|reason| LaunchError::Identity {
            user: username.to_string(),
            reason,
        })
    }
}

#[cfg(not(unix))]
impl IdentityResolver for SystemIdentities {
    fn resolve(&self, username: &str) -> Result<Identity, LaunchError> {
        Err(LaunchError::Identity {
            user: username.to_string(),
            reason: "running scripts as another user is not supported on this platform"
                .to_string(),
        })
    }
}

/// Configures `cmd` to switch to `identity` between fork and exec.
///
/// Groups are set first, then the gid, then the uid, since dropping the uid
/// removes the right to change the others.
#[cfg(unix)]
pub fn apply_identity(cmd: &mut Command, identity: Identity) {
    let Identity { uid, gid, groups } = identity;
    let groups: Vec<libc::gid_t> = groups.into_iter().map(|g| g as libc::gid_t).collect();
    // SAFETY: the closure only performs async-signal-safe syscalls on data
    // captured before fork.
    unsafe {
        cmd.pre_exec(move || {
            if libc::setgroups(groups.len() as _, groups.as_ptr()) != 0 {
                return Err(std::io::Error::last_os_error());
            }
            if libc::setgid(gid as libc::gid_t) != 0 {
                return Err(std::io::Error::last_os_error());
            }
            if libc::setuid(uid as libc::uid_t) != 0 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(not(unix))]
pub fn apply_identity(_cmd: &mut Command, _identity: Identity) {}

/// Gives ownership of a materialized script to `identity` so the child can
/// still read it after dropping privileges.
#[cfg(unix)]
pub fn hand_over(path: &Path, identity: &Identity) -> std::io::Result<()> {
    std::os::unix::fs::chown(path, Some(identity.uid), Some(identity.gid))
}

#[cfg(not(unix))]
pub fn hand_over(_path: &Path, _identity: &Identity) -> std::io::Result<()> {
    Ok(())
}

#[cfg(unix)]
mod sys {
    use std::ffi::CString;
    use std::ptr;

    use super::Identity;

    #[cfg(target_vendor = "apple")]
    type RawGroup = libc::c_int;
    #[cfg(not(target_vendor = "apple"))]
    type RawGroup = libc::gid_t;

    const MAX_BUFFER: usize = 1 << 20;

    pub(super) fn lookup(username: &str) -> Result<Identity, String> {
        let name = CString::new(username).map_err(|_| "user: invalid username".to_string())?;

        // SAFETY: zeroed passwd is a valid out-parameter for getpwnam_r.
        let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = ptr::null_mut();
        let mut buf: Vec<libc::c_char> = vec![0; 4096];

        loop {
            // SAFETY: all pointers are valid for the duration of the call
            // and `buf.len()` is the true buffer size.
            let rc = unsafe {
                libc::getpwnam_r(
                    name.as_ptr(),
                    &mut pwd,
                    buf.as_mut_ptr(),
                    buf.len(),
                    &mut result,
                )
            };
            if rc == libc::ERANGE && buf.len() < MAX_BUFFER {
                buf.resize(buf.len() * 2, 0);
                continue;
            }
            if rc != 0 {
                return Err(format!(
                    "user: lookup failed: {}",
                    std::io::Error::from_raw_os_error(rc)
                ));
            }
            break;
        }

        if result.is_null() {
            return Err("user: unknown user".to_string());
        }

        let uid = pwd.pw_uid as u32;
        let gid = pwd.pw_gid as u32;
        let groups = group_list(&name, pwd.pw_gid)?;
        Ok(Identity { uid, gid, groups })
    }

    fn group_list(name: &CString, gid: libc::gid_t) -> Result<Vec<u32>, String> {
        let mut capacity: libc::c_int = 32;
        loop {
            let mut groups: Vec<RawGroup> = vec![0; capacity as usize];
            let mut count = capacity;
            // SAFETY: `groups` holds `count` writable entries.
            let rc = unsafe {
                libc::getgrouplist(
                    name.as_ptr(),
                    gid as RawGroup,
                    groups.as_mut_ptr(),
                    &mut count,
                )
            };
            if rc >= 0 {
                groups.truncate(count.max(0) as usize);
                return Ok(groups.into_iter().map(|g| g as u32).collect());
            }
            // Linux reports the required size in `count`; other platforms
            // leave it untouched, so grow geometrically.
            let next = if count > capacity { count } else { capacity * 2 };
            if next as usize > 65536 {
                return Err("user: too many supplementary groups".to_string());
            }
            capacity = next;
        }
    }
}
