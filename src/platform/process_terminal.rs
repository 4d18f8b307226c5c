//! Process-backed terminal (stdin/stdout) and the scoped raw-mode guard.

use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};

use crate::core::input::{Key, KeyDecoder};
use crate::core::terminal::Terminal;

#[cfg(unix)]
use libc::{self, c_int};

/// How long a lone ESC waits for the rest of an escape sequence.
pub const ESCAPE_TIMEOUT_MS: i32 = 25;

const DEFAULT_COLUMNS: u16 = 80;

#[cfg(unix)]
fn get_termios(fd: c_int) -> io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

#[cfg(unix)]
fn set_termios(fd: c_int, termios: &libc::termios) -> io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(unix)]
fn poll_readable(fd: c_int, timeout_ms: i32) -> bool {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
    result > 0 && (fds.revents & libc::POLLIN) != 0
}

#[cfg(unix)]
fn read_winsize(fd: c_int) -> Option<(u16, u16)> {
    let mut winsize = unsafe { std::mem::zeroed::<libc::winsize>() };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut winsize) };
    if result == 0 && winsize.ws_col > 0 && winsize.ws_row > 0 {
        Some((winsize.ws_col, winsize.ws_row))
    } else {
        None
    }
}

/// Scoped raw input mode.
///
/// Acquiring saves the terminal's current attributes and switches to raw mode; dropping
/// restores the saved attributes. Guards nest: an inner guard restores the (already raw)
/// state its outer guard established, and the outer guard restores the original cooked state.
#[must_use = "raw mode ends as soon as the guard is dropped"]
pub struct RawModeGuard {
    #[cfg(unix)]
    restore: Option<(c_int, libc::termios)>,
    release: Option<Box<dyn FnOnce()>>,
}

impl RawModeGuard {
    /// A guard that owns no terminal state. Used by non-TTY and in-memory terminals.
    pub fn inert() -> Self {
        Self {
            #[cfg(unix)]
            restore: None,
            release: None,
        }
    }

    /// A guard that runs `release` when dropped instead of touching a real terminal.
    pub fn with_release(release: impl FnOnce() + 'static) -> Self {
        Self {
            #[cfg(unix)]
            restore: None,
            release: Some(Box::new(release)),
        }
    }

    /// Switch `fd` to raw mode until the guard is dropped.
    #[cfg(unix)]
    pub fn enable(fd: c_int) -> io::Result<Self> {
        let original = get_termios(fd)?;
        let mut raw = original;
        unsafe {
            libc::cfmakeraw(&mut raw);
        }
        set_termios(fd, &raw)?;
        Ok(Self {
            restore: Some((fd, original)),
            release: None,
        })
    }

    /// True when dropping this guard will restore terminal attributes.
    pub fn is_active(&self) -> bool {
        #[cfg(unix)]
        if self.restore.is_some() {
            return true;
        }
        self.release.is_some()
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        if let Some((fd, original)) = self.restore.take() {
            let _ = set_termios(fd, &original);
        }
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Terminal backed by the process's stdin/stdout.
#[cfg(unix)]
pub struct ProcessTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    interactive: bool,
    decoder: KeyDecoder,
    pending_keys: VecDeque<Key>,
}

#[cfg(unix)]
impl ProcessTerminal {
    pub fn new() -> Self {
        let interactive = io::stdin().is_terminal() && io::stdout().is_terminal();
        Self {
            stdin_fd: libc::STDIN_FILENO,
            stdout_fd: libc::STDOUT_FILENO,
            interactive,
            decoder: KeyDecoder::new(),
            pending_keys: VecDeque::new(),
        }
    }

    fn read_chunk(&mut self) -> io::Result<usize> {
        let mut buffer = [0u8; 256];
        loop {
            let read_len =
                unsafe { libc::read(self.stdin_fd, buffer.as_mut_ptr() as *mut _, buffer.len()) };
            if read_len < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }

            let read_len = read_len as usize;
            let keys = self.decoder.feed(&buffer[..read_len]);
            self.pending_keys.extend(keys);
            return Ok(read_len);
        }
    }
}

#[cfg(unix)]
impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl Terminal for ProcessTerminal {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn raw_mode(&mut self) -> io::Result<RawModeGuard> {
        if !self.interactive {
            return Ok(RawModeGuard::inert());
        }
        RawModeGuard::enable(self.stdin_fd)
    }

    fn read_key(&mut self) -> io::Result<Option<Key>> {
        loop {
            if let Some(key) = self.pending_keys.pop_front() {
                return Ok(Some(key));
            }

            if self.decoder.has_pending() && !poll_readable(self.stdin_fd, ESCAPE_TIMEOUT_MS) {
                let keys = self.decoder.flush();
                self.pending_keys.extend(keys);
                continue;
            }

            if self.read_chunk()? == 0 {
                if self.decoder.has_pending() {
                    let keys = self.decoder.flush();
                    self.pending_keys.extend(keys);
                    continue;
                }
                return Ok(None);
            }
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        read_stdin_line()
    }

    fn write(&mut self, data: &str) {
        if data.is_empty() {
            return;
        }
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(data.as_bytes());
        let _ = stdout.flush();
    }

    fn columns(&self) -> u16 {
        read_winsize(self.stdout_fd)
            .map(|(columns, _)| columns)
            .unwrap_or(DEFAULT_COLUMNS)
    }
}

/// Line-only fallback for platforms without termios.
#[cfg(not(unix))]
pub struct ProcessTerminal;

#[cfg(not(unix))]
impl ProcessTerminal {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(unix))]
impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(unix))]
impl Terminal for ProcessTerminal {
    fn is_interactive(&self) -> bool {
        false
    }

    fn raw_mode(&mut self) -> io::Result<RawModeGuard> {
        Ok(RawModeGuard::inert())
    }

    fn read_key(&mut self) -> io::Result<Option<Key>> {
        Ok(None)
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        read_stdin_line()
    }

    fn write(&mut self, data: &str) {
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(data.as_bytes());
        let _ = stdout.flush();
    }

    fn columns(&self) -> u16 {
        DEFAULT_COLUMNS
    }
}

fn read_stdin_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed_len);
    Ok(Some(line))
}

#[cfg(all(test, unix))]
mod tests {
    use libc::{self, c_int};

    use super::{get_termios, poll_readable, RawModeGuard};

    struct Pty {
        master: c_int,
        slave: c_int,
    }

    impl Drop for Pty {
        fn drop(&mut self) {
            unsafe {
                libc::close(self.master);
                libc::close(self.slave);
            }
        }
    }

    fn open_pty() -> Pty {
        let mut master: c_int = 0;
        let mut slave: c_int = 0;
        let result = unsafe {
            libc::openpty(
                &mut master,
                &mut slave,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        assert_eq!(result, 0, "openpty failed");
        Pty { master, slave }
    }

    #[test]
    fn guard_restores_original_attributes_on_drop() {
        let pty = open_pty();
        let original = get_termios(pty.slave).expect("get termios");
        assert_ne!(original.c_lflag & libc::ICANON, 0, "pty should start cooked");

        {
            let guard = RawModeGuard::enable(pty.slave).expect("enable raw mode");
            assert!(guard.is_active());
            let raw = get_termios(pty.slave).expect("get termios");
            assert_eq!(raw.c_lflag & libc::ICANON, 0, "raw mode not applied");
            assert_eq!(raw.c_lflag & libc::ECHO, 0, "echo still enabled");
        }

        let restored = get_termios(pty.slave).expect("get termios");
        assert_eq!(restored.c_lflag, original.c_lflag, "raw mode not restored");
    }

    #[test]
    fn nested_guards_restore_in_order() {
        let pty = open_pty();
        let original = get_termios(pty.slave).expect("get termios");

        let outer = RawModeGuard::enable(pty.slave).expect("outer raw mode");
        {
            let _inner = RawModeGuard::enable(pty.slave).expect("inner raw mode");
        }
        let after_inner = get_termios(pty.slave).expect("get termios");
        assert_eq!(
            after_inner.c_lflag & libc::ICANON,
            0,
            "inner guard must restore the outer raw state"
        );

        drop(outer);
        let restored = get_termios(pty.slave).expect("get termios");
        assert_eq!(restored.c_lflag, original.c_lflag);
    }

    #[test]
    fn guard_restores_during_unwind() {
        let pty = open_pty();
        let original = get_termios(pty.slave).expect("get termios");
        let slave = pty.slave;

        let outcome = std::panic::catch_unwind(move || {
            let _guard = RawModeGuard::enable(slave).expect("enable raw mode");
            panic!("dialog failed");
        });
        assert!(outcome.is_err());

        let restored = get_termios(pty.slave).expect("get termios");
        assert_eq!(restored.c_lflag, original.c_lflag);
    }

    #[test]
    fn inert_guard_touches_nothing() {
        let guard = RawModeGuard::inert();
        assert!(!guard.is_active());
    }

    #[test]
    fn release_callback_runs_once_on_drop() {
        use std::cell::Cell;
        use std::rc::Rc;

        let released = Rc::new(Cell::new(0));
        let counter = Rc::clone(&released);
        let guard = RawModeGuard::with_release(move || counter.set(counter.get() + 1));
        assert!(guard.is_active());
        drop(guard);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn poll_reports_pending_bytes() {
        let pty = open_pty();
        assert!(!poll_readable(pty.master, 0));
        let written =
            unsafe { libc::write(pty.slave, b"x".as_ptr() as *const libc::c_void, 1) };
        assert_eq!(written, 1);
        assert!(poll_readable(pty.master, 200));
    }
}
