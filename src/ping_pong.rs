#[derive(Clone, Debug)]
pub struct PingPong<T> {
    a: T,
    b: T,
    a_is_read: bool,
}

impl<T> PingPong<T> {
    pub fn new(a: T, b: T) -> Self {
        Self {
            a,
            b,
            a_is_read: true,
        }
    }

    pub fn read(&self) -> &T {
        if self.a_is_read {
            &self.a
        } else {
            &self.b
        }
    }

    pub fn write(&mut self) -> &mut T {
        if self.a_is_read {
            &mut self.b
        } else {
            &mut self.a
        }
    }

    pub fn split(&mut self) -> (&T, &mut T) {
        if self.a_is_read {
            (&self.a, &mut self.b)
        } else {
            (&self.b, &mut self.a)
        }
    }

    pub fn swap(&mut self) {
        self.a_is_read = !self.a_is_read;
    }

    pub fn both_mut(&mut self) -> (&mut T, &mut T) {
        (&mut self.a, &mut self.b)
    }
}

impl<T: Clone> PingPong<T> {
    pub fn splat(value: T) -> Self {
        Self::new(value.clone(), value)
    }
}
