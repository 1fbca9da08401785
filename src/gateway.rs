// MIT License - Copyright (c) 2026 Peter Wright
// SCSGate switch platform

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::message::{Message, ScsId, Task};

/// A device the gateway dispatcher delivers bus messages to.
pub trait GatewayDevice: Send + Sync {
    fn scs_id(&self) -> &ScsId;

    fn name(&self) -> &str;

    /// Handle a message addressed to this device.
    ///
    /// Returns false when the device does not understand the message.
    /// Called on whichever thread the dispatcher runs.
    fn process_event(&self, message: &Message) -> bool;
}

/// The gateway client as seen by the switch platform.
pub trait Gateway: Send + Sync {
    /// Whether a device with this id is already registered.
    fn has_device(&self, scs_id: &ScsId) -> bool;

    /// Register a single device with the dispatcher.
    fn add_device(&self, device: Arc<dyn GatewayDevice>);

    /// Register devices whose initial state must be queried from the bus.
    fn add_devices_to_register(&self, devices: Vec<Arc<dyn GatewayDevice>>);

    /// Queue a task for the bus. Does not wait for it to run.
    fn append_task(&self, task: Task);
}

/// Type alias for the task queue sender.
pub type TaskSender = tokio::sync::mpsc::UnboundedSender<Task>;

/// Type alias for the task queue receiver.
pub type TaskReceiver = tokio::sync::mpsc::UnboundedReceiver<Task>;

/// Create a new task channel.
pub fn task_channel() -> (TaskSender, TaskReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// In-process gateway: a device registry and dispatcher whose task queue is
/// a channel drained by whatever talks to the bus.
pub struct MemoryGateway {
    devices: RwLock<HashMap<ScsId, Arc<dyn GatewayDevice>>>,
    tasks: TaskSender,
}

impl MemoryGateway {
    pub fn new(tasks: TaskSender) -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
            tasks,
        }
    }

    /// Ids of all registered devices, sorted.
    pub fn device_ids(&self) -> Vec<ScsId> {
        let devices = self.devices.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<ScsId> = devices.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a bus message to the device it addresses.
    ///
    /// Returns whether a registered device received and handled it.
    pub fn dispatch(&self, message: &Message) -> bool {
        let Some(entity) = message.entity() else {
            debug!("Dropping message without entity: {message}");
            return false;
        };
        // Release the registry lock before calling into the device.
        let device = {
            let devices = self.devices.read().unwrap_or_else(PoisonError::into_inner);
            devices.get(entity).cloned()
        };
        match device {
            Some(device) => {
                debug!("Dispatching {message} to {}", device.name());
                device.process_event(message)
            }
            None => {
                debug!("No device registered for {entity}, dropping {message}");
                false
            }
        }
    }

    fn register(&self, device: Arc<dyn GatewayDevice>) {
        let id = device.scs_id().clone();
        let mut devices = self.devices.write().unwrap_or_else(PoisonError::into_inner);
        if devices.insert(id.clone(), device).is_some() {
            warn!("Replacing device already registered as {id}");
        }
    }
}

impl Gateway for MemoryGateway {
    fn has_device(&self, scs_id: &ScsId) -> bool {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(scs_id)
    }

    fn add_device(&self, device: Arc<dyn GatewayDevice>) {
        info!("Registering device {} ({})", device.scs_id(), device.name());
        self.register(device);
    }

    fn add_devices_to_register(&self, devices: Vec<Arc<dyn GatewayDevice>>) {
        for device in devices {
            let target = device.scs_id().clone();
            info!("Registering device {target} ({}), requesting status", device.name());
            self.register(device);
            self.append_task(Task::RequestStatus { target });
        }
    }

    fn append_task(&self, task: Task) {
        debug!("Queueing task {task:?}");
        if self.tasks.send(task).is_err() {
            warn!("Task queue closed, dropping task");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        scs_id: ScsId,
        seen: Mutex<Vec<Message>>,
    }

    impl Recorder {
        fn new(id: &str) -> Arc<Self> {
            Arc::new(Self {
                scs_id: id.into(),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl GatewayDevice for Recorder {
        fn scs_id(&self) -> &ScsId {
            &self.scs_id
        }
        fn name(&self) -> &str {
            "recorder"
        }
        fn process_event(&self, message: &Message) -> bool {
            self.seen.lock().unwrap().push(message.clone());
            message.toggled().is_some()
        }
    }

    #[test]
    fn test_dispatch_routes_by_entity() {
        let (tx, _rx) = task_channel();
        let gateway = MemoryGateway::new(tx);
        let a = Recorder::new("1");
        let b = Recorder::new("2");
        gateway.add_device(a.clone());
        gateway.add_device(b.clone());

        let msg = Message::State {
            entity: "2".into(),
            toggled: true,
            bytes: vec![],
        };
        assert!(gateway.dispatch(&msg));
        assert!(a.seen.lock().unwrap().is_empty());
        assert_eq!(b.seen.lock().unwrap().as_slice(), &[msg]);

        assert!(!gateway.dispatch(&Message::RequestStatus {
            entity: "9".into(),
            bytes: vec![],
        }));
        assert!(!gateway.dispatch(&Message::Unknown { bytes: vec![1] }));
    }

    #[test]
    fn test_dispatch_reports_unhandled_messages() {
        let (tx, _rx) = task_channel();
        let gateway = MemoryGateway::new(tx);
        let device = Recorder::new("1");
        gateway.add_device(device.clone());

        assert!(!gateway.dispatch(&Message::RequestStatus {
            entity: "1".into(),
            bytes: vec![],
        }));
        assert_eq!(device.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_register_queues_status_requests() {
        let (tx, mut rx) = task_channel();
        let gateway = MemoryGateway::new(tx);
        let devices: Vec<Arc<dyn GatewayDevice>> = vec![
            Recorder::new("4") as Arc<dyn GatewayDevice>,
            Recorder::new("3") as Arc<dyn GatewayDevice>,
        ];
        gateway.add_devices_to_register(devices);

        assert_eq!(gateway.device_ids(), vec![ScsId::from("3"), ScsId::from("4")]);
        assert_eq!(rx.try_recv().unwrap(), Task::RequestStatus { target: "4".into() });
        assert_eq!(rx.try_recv().unwrap(), Task::RequestStatus { target: "3".into() });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_add_device_does_not_queue_tasks() {
        let (tx, mut rx) = task_channel();
        let gateway = MemoryGateway::new(tx);
        assert!(gateway.is_empty());
        gateway.add_device(Recorder::new("7"));
        assert!(gateway.has_device(&"7".into()));
        assert_eq!(gateway.len(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_append_task_with_closed_queue() {
        let (tx, rx) = task_channel();
        drop(rx);
        let gateway = MemoryGateway::new(tx);
        gateway.append_task(Task::toggle("1".into(), true));
    }
}
