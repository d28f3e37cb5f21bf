// module logging

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Level {
    INFO,
    DEBUG,
    TRACE,
}

pub struct Logging {
    pub log_level: Level,
}

impl Logging {
    pub fn info(&self, msg: &str) {
        println!("\x1b[1;94m{}\x1b[0m : {}", " [ INFO  ]", msg);
    }

    pub fn debug(&self, msg: &str) {
        if self.log_level >= Level::DEBUG {
            println!("\x1b[1;92m{}\x1b[0m : {}", " [ DEBUG ]", msg);
        }
    }

    pub fn trace(&self, msg: &str) {
        if self.log_level >= Level::TRACE {
            println!("\x1b[1;96m{}\x1b[0m : {}", " [ TRACE ]", msg);
        }
    }

    pub fn warn(&self, msg: &str) {
        println!("\x1b[1;93m{}\x1b[0m : {}", " [ WARN  ]", msg);
    }

    pub fn error(&self, msg: &str) {
        println!("\x1b[1;91m{}\x1b[0m : {}", " [ ERROR ]", msg);
    }

    // highlighted variants of info
    pub fn hi(&self, msg: &str) {
        println!("\x1b[1;95m{}\x1b[0m : {}", " [ INFO  ]", msg);
    }

    pub fn mid(&self, msg: &str) {
        println!("\x1b[1;94m{}\x1b[0m : {}", " [ INFO  ]", msg);
    }

    pub fn lo(&self, msg: &str) {
        println!("\x1b[1;97m{}\x1b[0m : {}", " [ INFO  ]", msg);
    }
}
