macro_rules! keyword {
    ($emitter:expr, $s:expr) => {
        $emitter.wr.write_keyword($s)?
    };
}

macro_rules! punct {
    ($emitter:expr, $s:expr) => {
        $emitter.wr.write_punct($s)?
    };
}

macro_rules! operator {
    ($emitter:expr, $s:expr) => {
        $emitter.wr.write_operator($s)?
    };
}

macro_rules! space {
    ($emitter:expr) => {
        $emitter.wr.write_space()?
    };
}

macro_rules! formatting_space {
    ($emitter:expr) => {
        if !$emitter.cfg.minify {
            $emitter.wr.write_space()?;
        }
    };
}

macro_rules! formatting_newline {
    ($emitter:expr) => {
        if !$emitter.cfg.minify {
            $emitter.wr.write_line()?;
        }
    };
}

macro_rules! semi {
    ($emitter:expr) => {
        punct!($emitter, ";")
    };
}
