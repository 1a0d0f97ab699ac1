use super::*;

fn readable(fd: RawFd) -> bool {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let ret = unsafe { libc::poll(&mut pfd, 1, 0) };
    ret == 1 && pfd.revents & libc::POLLIN != 0
}

#[test]
fn wake_makes_the_reader_readable_until_drained() {
    let (waker, reader) = wakeup_pipe().unwrap();
    assert!(!readable(reader.raw_fd()));

    waker.wake();
    waker.clone().wake();
    assert!(readable(reader.raw_fd()));
    assert_eq!(reader.drain(), 2);
    assert!(!readable(reader.raw_fd()));
    assert_eq!(reader.drain(), 0);
}

#[test]
fn waking_a_full_pipe_does_not_block() {
    let (waker, reader) = wakeup_pipe().unwrap();
    for _ in 0..200_000 {
        waker.wake();
    }
    assert!(reader.drain() > 0);
}
